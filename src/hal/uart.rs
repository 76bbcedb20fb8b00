//! Console UART over the ESP-IDF driver.
//!
//! [`install`] configures the peripheral, installs the driver with its
//! event queue and hands back the two halves the transport needs: a
//! [`UartPort`] for byte I/O and a [`UartEventQueue`] for arrival
//! notifications. Register-level detail stays behind the driver API.

#[cfg(not(test))]
use core::time::Duration;

#[cfg(not(test))]
use crate::error::ConsoleIoError;

#[cfg(not(test))]
use crate::event::{EventSource, PortEvent};
#[cfg(not(test))]
use crate::port::SerialPort;

#[cfg(not(test))]
use esp_idf_svc::hal::delay::TickType;
#[cfg(not(test))]
use esp_idf_svc::sys::{
    esp, uart_config_t, uart_driver_install, uart_event_t, uart_event_type_t_UART_BREAK,
    uart_event_type_t_UART_BUFFER_FULL, uart_event_type_t_UART_DATA,
    uart_event_type_t_UART_FIFO_OVF, uart_event_type_t_UART_FRAME_ERR,
    uart_event_type_t_UART_PARITY_ERR, uart_flush, uart_get_buffered_data_len,
    uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE, uart_param_config,
    uart_parity_t_UART_PARITY_DISABLE, uart_port_t, uart_read_bytes, uart_set_pin,
    uart_stop_bits_t_UART_STOP_BITS_1, uart_word_length_t_UART_DATA_8_BITS, uart_write_bytes,
    xQueueReceive, QueueHandle_t,
};

/// UART configuration for the console.
///
/// Frame format is fixed at 8N1 with no flow control; only the knobs the
/// console actually varies are exposed.
pub struct UartConsoleConfig {
    /// UART controller number.
    pub uart_num: i32,
    pub baud_rate: u32,
    /// `None` keeps the pin the bootloader console already uses.
    pub tx_pin: Option<i32>,
    pub rx_pin: Option<i32>,
    /// Driver ring buffers, twice the 128-byte hardware FIFO.
    pub rx_buffer_size: usize,
    pub tx_buffer_size: usize,
    /// Depth of the driver's event queue.
    pub event_queue_depth: usize,
}

impl Default for UartConsoleConfig {
    fn default() -> Self {
        Self {
            uart_num: 0,
            baud_rate: 115_200,
            tx_pin: None,
            rx_pin: None,
            rx_buffer_size: 256,
            tx_buffer_size: 256,
            event_queue_depth: 2,
        }
    }
}

#[cfg(not(test))]
const PIN_NO_CHANGE: i32 = -1;

#[cfg(not(test))]
fn pin(p: Option<i32>) -> i32 {
    p.unwrap_or(PIN_NO_CHANGE)
}

/// Byte I/O half of the console UART.
#[cfg(not(test))]
pub struct UartPort {
    port: uart_port_t,
}

/// Notification half of the console UART: the driver's event queue.
#[cfg(not(test))]
pub struct UartEventQueue {
    queue: QueueHandle_t,
}

// SAFETY: The queue handle is consumed from a single task; FreeRTOS
// queue receive is safe from any task context.
#[cfg(not(test))]
unsafe impl Send for UartEventQueue {}

/// Configure the peripheral and install the driver.
///
/// 8N1, no flow control, at `config.baud_rate`; remaps pins only when
/// the config names them. Stale input buffered before install is
/// flushed. Returns the port handle and the event queue the bridge task
/// consumes.
#[cfg(not(test))]
pub fn install(config: &UartConsoleConfig) -> Result<(UartPort, UartEventQueue), ConsoleIoError> {
    let port = config.uart_num as uart_port_t;

    let uart_config = uart_config_t {
        baud_rate: config.baud_rate as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        rx_flow_ctrl_thresh: 1,
        ..Default::default()
    };

    esp!(unsafe { uart_param_config(port, &uart_config) }).map_err(|_| ConsoleIoError::Config)?;
    esp!(unsafe {
        uart_set_pin(
            port,
            pin(config.tx_pin),
            pin(config.rx_pin),
            PIN_NO_CHANGE,
            PIN_NO_CHANGE,
        )
    })
    .map_err(|_| ConsoleIoError::Config)?;

    let mut queue: QueueHandle_t = core::ptr::null_mut();
    esp!(unsafe {
        uart_driver_install(
            port,
            config.rx_buffer_size as i32,
            config.tx_buffer_size as i32,
            config.event_queue_depth as i32,
            &mut queue,
            0,
        )
    })
    .map_err(|_| ConsoleIoError::Config)?;

    esp!(unsafe { uart_flush(port) }).map_err(|_| ConsoleIoError::Config)?;

    Ok((UartPort { port }, UartEventQueue { queue }))
}

#[cfg(not(test))]
impl SerialPort for UartPort {
    fn bytes_available(&self) -> usize {
        let mut buffered: usize = 0;
        // SAFETY: driver installed before this handle exists
        match esp!(unsafe { uart_get_buffered_data_len(self.port, &mut buffered) }) {
            Ok(()) => buffered,
            Err(_) => 0,
        }
    }

    fn read(&self, dest: &mut [u8], timeout: Duration) -> usize {
        if dest.is_empty() {
            return 0;
        }

        // SAFETY: dest outlives the call, length is dest's
        let got = unsafe {
            uart_read_bytes(
                self.port,
                dest.as_mut_ptr() as *mut core::ffi::c_void,
                dest.len() as u32,
                TickType::from(timeout).0,
            )
        };

        if got < 0 {
            0
        } else {
            got as usize
        }
    }

    fn write(&self, src: &[u8]) -> Result<usize, ConsoleIoError> {
        // SAFETY: src outlives the call, length is src's
        let sent = unsafe {
            uart_write_bytes(self.port, src.as_ptr() as *const core::ffi::c_void, src.len())
        };

        if sent < 0 {
            Err(ConsoleIoError::WriteRejected)
        } else {
            Ok(sent as usize)
        }
    }
}

#[cfg(not(test))]
impl EventSource for UartEventQueue {
    fn wait(&self, timeout: Duration) -> Result<Option<PortEvent>, ConsoleIoError> {
        if self.queue.is_null() {
            return Err(ConsoleIoError::ChannelDown);
        }

        let mut raw = uart_event_t::default();
        // SAFETY: raw outlives the call; queue handle valid for the
        // driver's lifetime (which is the process lifetime)
        let received = unsafe {
            xQueueReceive(
                self.queue,
                &mut raw as *mut uart_event_t as *mut core::ffi::c_void,
                TickType::from(timeout).0,
            )
        };

        if received != 0 {
            Ok(Some(map_event(&raw)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(not(test))]
fn map_event(event: &uart_event_t) -> PortEvent {
    match event.type_ {
        uart_event_type_t_UART_DATA => PortEvent::DataReady { len: event.size },
        uart_event_type_t_UART_BREAK => PortEvent::Break,
        uart_event_type_t_UART_BUFFER_FULL => PortEvent::BufferFull,
        uart_event_type_t_UART_FIFO_OVF => PortEvent::FifoOverflow,
        uart_event_type_t_UART_FRAME_ERR => PortEvent::FrameError,
        uart_event_type_t_UART_PARITY_ERR => PortEvent::ParityError,
        other => PortEvent::Other(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UartConsoleConfig::default();

        assert_eq!(config.uart_num, 0);
        assert_eq!(config.baud_rate, 115_200);
        assert!(config.tx_pin.is_none());
        assert!(config.rx_pin.is_none());
        assert_eq!(config.rx_buffer_size, 256);
        assert_eq!(config.tx_buffer_size, 256);
    }
}
