//! CrowdSense — ESP32 presence-density sensor firmware
//!
//! Scans for BLE advertisers in fixed rounds, excludes the installation's
//! own devices, classifies the remaining crowd, and latches a one-byte
//! actuation command. The effect controller polls the command over I2C;
//! two LEDs pulse out the per-cycle counts for the operators.

#![no_std]
#![no_main]

extern crate alloc;

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

use core::sync::atomic::{AtomicU32, Ordering};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_deadline, Duration, Instant, Timer};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use trouble_host::prelude::*;

use crowdsense::channel::{serialize_message, CommandLatch, RESPONDER_ADDRESS};
use crowdsense::cycle::run_cycle;
use crowdsense::filter::SenseConfig;
use crowdsense::protocol::{DeviceMessage, MsgBuffer, MAX_MSG_LEN, VERSION};
use crowdsense::scanner::{record, Observation, ScanResult, MAX_OBSERVATIONS};
use crowdsense::{board, defaults};

// ── Channel type aliases ──────────────────────────────────────────────

type ObservationChannel = Channel<CriticalSectionRawMutex, Observation, MAX_OBSERVATIONS>;
type IndicatorChannel = Channel<CriticalSectionRawMutex, (u16, u16), 2>;
type OutputChannel = Channel<CriticalSectionRawMutex, MsgBuffer, 8>;

// ── Static channels and shared state ─────────────────────────────────

/// Observations from the BLE scan handler, drained once per cycle
static OBSERVATIONS: ObservationChannel = Channel::new();

/// Pre-reset count snapshots for the LED indicator
static INDICATOR: IndicatorChannel = Channel::new();

/// Serialized NDJSON messages for the serial console
static OUTPUT: OutputChannel = Channel::new();

/// The published actuation command, served on every I2C master read.
/// Survives across cycles; only the encoding step overwrites it.
static COMMAND: CommandLatch = CommandLatch::new();

/// Completed cycles, reported in the periodic status message
static CYCLES: AtomicU32 = AtomicU32::new(0);

// ── BLE scan event handler ───────────────────────────────────────────

/// EventHandler for BLE advertisement reports from trouble-host.
///
/// Called synchronously from the stack runner — must not block, so it only
/// copies the address and RSSI out of each report. Exclusion and counting
/// happen later, per observation, in the cycle pass.
struct ScanEventHandler;

impl EventHandler for ScanEventHandler {
    fn on_adv_reports(&self, mut it: LeAdvReportsIter<'_>) {
        while let Some(Ok(report)) = it.next() {
            let addr: [u8; 6] = report.addr.raw().try_into().unwrap();
            let _ = OBSERVATIONS.try_send(Observation::new(addr, report.rssi));
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────

#[esp_rtos::main]
async fn main(spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Heap for the BLE stack
    esp_alloc::heap_allocator!(size: 64 * 1024);

    // Start the RTOS — requires timer + software interrupt
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!("CrowdSense v{} starting on {}", VERSION, board::BOARD_NAME);
    log::info!(
        "Registry loaded: {} known devices, thresholds {} / {} dBm",
        defaults::KNOWN_DEVICES.len(),
        defaults::GENERAL_RSSI_THRESHOLD,
        defaults::CLOSE_RSSI_THRESHOLD,
    );

    // Indicator LEDs
    let general_led = Output::new(
        peripherals.GPIO18,
        Level::Low,
        OutputConfig::default(),
    );
    let close_led = Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default());

    // I2C responder for the effect controller
    let i2c = esp_hal::i2c::slave::I2c::new(
        peripherals.I2C0,
        esp_hal::i2c::slave::Config::default().with_address(RESPONDER_ADDRESS),
    )
    .expect("I2C responder init failed")
    .with_sda(peripherals.GPIO21)
    .with_scl(peripherals.GPIO22)
    .into_async();

    spawner.spawn(indicator_task(general_led, close_led)).unwrap();
    spawner.spawn(responder_task(i2c)).unwrap();
    spawner.spawn(output_serial_task()).unwrap();
    spawner.spawn(status_task()).unwrap();

    // ── BLE radio initialization ───────────────────────────────────────

    let connector =
        esp_radio::ble::controller::BleConnector::new(peripherals.BT, Default::default())
            .expect("BLE connector init failed");

    let controller: ExternalController<_, 20> = ExternalController::new(connector);

    static HOST_RESOURCES: StaticCell<HostResources<DefaultPacketPool, 1, 2>> = StaticCell::new();
    let resources = HOST_RESOURCES.init(HostResources::new());

    let address = Address::random([0xff, 0x8f, 0x1a, 0x05, 0xe4, 0xab]);

    let stack = trouble_host::new(controller, resources).set_random_address(address);
    let Host {
        central,
        mut runner,
        ..
    } = stack.build();

    log::info!("BLE radio initialized");

    let scan_handler = ScanEventHandler;

    // ── Orchestration ──────────────────────────────────────────────────
    //
    // Two concurrent futures via join:
    //   1. BLE stack runner (drives HCI, delivers adv reports to handler)
    //   2. Cycle loop (scan round, pipeline, publish, indicate, repeat)

    let _ = embassy_futures::join::join(
        // ── Runner: drives the BLE stack ────────────────────────────────
        async {
            loop {
                if let Err(e) = runner.run_with_handler(&scan_handler).await {
                    log::error!("BLE runner error: {:?}", e);
                    Timer::after(Duration::from_secs(1)).await;
                }
            }
        },
        // ── Cycle loop ──────────────────────────────────────────────────
        cycle_loop(central),
    )
    .await;
}

/// The repeating cycle: scan round, drain, classify, publish, indicate.
/// Runs indefinitely; each cycle starts as soon as the prior one finishes.
async fn cycle_loop<C: Controller, P: PacketPool>(central: Central<'_, C, P>) {
    let cfg = SenseConfig::new();

    let mut config = ScanConfig::default();
    config.active = true;
    config.interval = Duration::from_micros(defaults::SCAN_INTERVAL as u64 * 625);
    config.window = Duration::from_micros(defaults::SCAN_WINDOW as u64 * 625);

    let mut scanner = trouble_host::scan::Scanner::new(central);

    loop {
        // Scanning: hold a scan session for the fixed round duration.
        // Reports arrive through ScanEventHandler on the runner and are
        // collapsed to one observation per device as they come in, so a
        // chatty advertiser can neither inflate the counts nor crowd
        // distinct devices out of the buffers.
        let mut scan = ScanResult::new();
        match scanner.scan(&config).await {
            Ok(session) => {
                let deadline = Instant::now() + Duration::from_secs(defaults::SCAN_SECS);
                while let Ok(obs) = with_deadline(deadline, OBSERVATIONS.receive()).await {
                    record(&mut scan, obs);
                }
                drop(session);
            }
            Err(e) => {
                log::error!("BLE scan failed to start: {:?}", e);
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        }

        // Pick up reports that landed between the deadline and session end
        while let Ok(obs) = OBSERVATIONS.try_receive() {
            record(&mut scan, obs);
        }

        // Filter, count, classify, encode
        let outcome = run_cycle(&scan, &cfg);

        // Publishing: the latch keeps serving this byte until the next cycle
        COMMAND.publish(outcome.command);

        // Indicator gets the counts snapshot; the per-cycle state itself
        // is dropped at the end of this iteration
        let _ = INDICATOR.try_send((outcome.counts.general, outcome.counts.close));

        CYCLES.fetch_add(1, Ordering::Relaxed);

        let msg = DeviceMessage::Cycle {
            general: outcome.counts.general,
            close: outcome.counts.close,
            in_range: outcome.counts.general_seen,
            in_close_range: outcome.counts.close_seen,
            crowd: outcome.classification.as_str(),
            cmd: outcome.command.as_str(),
            ts: (Instant::now().as_millis() & 0xFFFF_FFFF) as u32,
        };
        send_output(&msg);
    }
}

/// Serialize a message and queue it for the serial console (non-blocking,
/// drops if the console is behind).
fn send_output(msg: &DeviceMessage) {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok();
    if let Some(len) = serialize_message(msg, &mut buf) {
        buf.truncate(len);
        let _ = OUTPUT.try_send(buf);
    }
}

/// I2C responder task — answers every master read with the latched
/// command byte, nothing else.
#[embassy_executor::task]
async fn responder_task(mut i2c: esp_hal::i2c::slave::I2c<'static, esp_hal::Async>) {
    log::info!("Command responder listening on I2C address {}", RESPONDER_ADDRESS);

    loop {
        let response = [COMMAND.current_byte()];
        if let Err(e) = i2c.respond(&response).await {
            log::warn!("I2C respond error: {:?}", e);
            Timer::after(Duration::from_millis(10)).await;
        }
    }
}

/// LED indicator task — pulses the general LED once per in-range device,
/// then the close LED once per close device.
#[embassy_executor::task]
async fn indicator_task(mut general_led: Output<'static>, mut close_led: Output<'static>) {
    loop {
        let (general, close) = INDICATOR.receive().await;
        pulse(&mut general_led, general).await;
        pulse(&mut close_led, close).await;
    }
}

async fn pulse(led: &mut Output<'static>, count: u16) {
    for _ in 0..count {
        led.set_high();
        Timer::after(Duration::from_millis(defaults::INDICATOR_PULSE_MS)).await;
        led.set_low();
        Timer::after(Duration::from_millis(defaults::INDICATOR_PULSE_MS)).await;
    }
}

/// Serial output task — drains the output channel to the console.
#[embassy_executor::task]
async fn output_serial_task() {
    log::info!("Serial output task started");

    let output_rx = OUTPUT.receiver();

    loop {
        let msg = output_rx.receive().await;
        if let Ok(s) = core::str::from_utf8(&msg) {
            log::info!("{}", s.trim_end());
        }
    }
}

/// Periodic status reporting task
#[embassy_executor::task]
async fn status_task() {
    loop {
        Timer::after(Duration::from_secs(30)).await;

        let msg = DeviceMessage::Status {
            uptime: (Instant::now().as_millis() / 1000) as u32,
            cycles: CYCLES.load(Ordering::Relaxed),
            heap_free: esp_alloc::HEAP.free() as u32,
            board: board::BOARD_NAME,
            version: VERSION,
        };
        send_output(&msg);
    }
}
