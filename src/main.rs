//! Console transport entry point.
//!
//! Wires the pieces together on hardware:
//! 1. Install the UART driver and event queue
//! 2. Build the `ConsoleIo` context and the bridge task over statics
//! 3. Spawn the bridge task
//! 4. Idle, draining transport logs out the console port

#![no_std]
#![no_main]

use esp_idf_svc::sys as esp_idf_sys;

use rust_uart_console::{
    bridge::{BridgeTask, InputHandler},
    console_io::ConsoleIo,
    hal::uart::{self, UartConsoleConfig, UartEventQueue, UartPort},
    log_globals::LOG_STREAM,
    logging::{format_entry, format_to_buffer},
};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Bridge task stack size in bytes.
const BRIDGE_TASK_STACK: u32 = 3072;

/// Bridge task priority (idle + 1).
const BRIDGE_TASK_PRIO: u32 = 1;

/// FreeRTOS tskNO_AFFINITY: let the scheduler pick the core.
const NO_AFFINITY: i32 = 0x7FFF_FFFF;

/// Stand-in command processor: drains each arrival burst so the driver
/// buffer never fills. The real interpreter implements `InputHandler`
/// the same way and reads through the same `ConsoleIo`.
struct DrainProcessor {
    io: &'static ConsoleIo<UartPort>,
    scratch: [u8; 64],
}

impl InputHandler for DrainProcessor {
    fn on_data_ready(&mut self) {
        loop {
            match self.io.receive(&mut self.scratch) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
}

// One-shot init in main before the bridge task starts; never touched
// again from more than one thread.
static mut CONSOLE: Option<ConsoleIo<UartPort>> = None;
static mut BRIDGE: Option<BridgeTask<'static, UartEventQueue, DrainProcessor>> = None;

extern "C" fn bridge_task_entry(_arg: *mut core::ffi::c_void) {
    // SAFETY: BRIDGE is set before the task is created
    let bridge = unsafe { BRIDGE.as_mut().expect("bridge not initialized") };
    bridge.run();

    // Only reached if the event channel died; the task ends cleanly.
    unsafe { esp_idf_sys::vTaskDelete(core::ptr::null_mut()) };
}

#[no_mangle]
fn main() {
    esp_idf_sys::link_patches();

    let (port, events) = match uart::install(&UartConsoleConfig::default()) {
        Ok(pair) => pair,
        // The console is the reporting channel; without it, abort.
        Err(err) => panic!("console UART init failed: {}", err),
    };

    // SAFETY: single-threaded here, one-shot init
    let console: &'static ConsoleIo<UartPort> = unsafe {
        CONSOLE = Some(ConsoleIo::new(port));
        CONSOLE.as_ref().expect("console not initialized")
    };

    console.set_echo(true);
    let _ = console.send_str(VERSION);
    let _ = console.send_str("\r\n");

    let processor = DrainProcessor {
        io: console,
        scratch: [0; 64],
    };

    // SAFETY: single-threaded here, one-shot init
    unsafe {
        BRIDGE = Some(BridgeTask::new(events, processor, &LOG_STREAM));
    }

    let created = unsafe {
        esp_idf_sys::xTaskCreatePinnedToCore(
            Some(bridge_task_entry),
            b"console_io\0".as_ptr().cast(),
            BRIDGE_TASK_STACK,
            core::ptr::null_mut(),
            BRIDGE_TASK_PRIO,
            core::ptr::null_mut(),
            NO_AFFINITY,
        )
    };
    if created != 1 {
        panic!("console bridge task creation failed");
    }

    loop {
        drain_logs(console);
        unsafe {
            esp_idf_sys::vTaskDelay(10);
        }
    }
}

/// Push pending transport logs out the console port.
fn drain_logs(io: &ConsoleIo<UartPort>) {
    let mut buf = [0u8; 160];

    while let Some(entry) = LOG_STREAM.drain() {
        let len = format_entry(&entry, &mut buf);
        let _ = io.send(&buf[..len]);
    }

    let dropped = LOG_STREAM.dropped();
    if dropped > 0 {
        let len = format_to_buffer(
            &mut buf,
            format_args!("[WARN] Dropped {} log entries\r\n", dropped),
        );
        let _ = io.send(&buf[..len]);
        LOG_STREAM.reset_dropped();
    }
}
