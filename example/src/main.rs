#![no_std]
#![no_main]

pub mod clock;
pub mod mutex;

use crate::clock::SystemClock;
use crate::mutex::Mutex;
use embedded_can::StandardId;
use fugit::RateExtU32;
use hal::clocks::Clock;
use hal::gpio::bank0::Gpio8;
use hal::gpio::{FunctionSioInput, Interrupt, Pin, PullUp};
use hal::pac;
use hal::pac::interrupt;
use panic_halt as _;
use rp2040_hal as hal;
use xl2515::can::{CanController, Controller};
use xl2515::interrupt::ReceiveSignal;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

const XTAL_FREQ_HZ: u32 = 12_000_000u32;

type IntPin = Pin<Gpio8, FunctionSioInput, PullUp>;

/// Set on falling edge of the controller INT line
static CAN_RX: ReceiveSignal = ReceiveSignal::new();

/// INT pin, owned by the GPIO interrupt handler once configured
static INT_PIN: Mutex<Option<IntPin>> = Mutex::new(None);

static CLOCK: SystemClock = SystemClock::default();

#[rp2040_hal::entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    CLOCK.initialize(timer);

    let sio = hal::Sio::new(pac.SIO);

    let pins = hal::gpio::Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);

    let spi_mosi = pins.gpio11.into_function::<hal::gpio::FunctionSpi>();
    let spi_miso = pins.gpio12.into_function::<hal::gpio::FunctionSpi>();
    let spi_sclk = pins.gpio10.into_function::<hal::gpio::FunctionSpi>();
    let spi = hal::spi::Spi::<_, _, _, 8>::new(pac.SPI1, (spi_mosi, spi_miso, spi_sclk));

    // Exchange the uninitialised SPI driver for an initialised one
    let spi = spi.init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        10.MHz(),
        embedded_hal::spi::MODE_0,
    );

    // Configure GPIO9 as an CS pin
    let mut pin_cs = pins.gpio9.into_push_pull_output();
    let _ = embedded_hal::digital::v2::OutputPin::set_high(&mut pin_cs);

    // Configure GPIO8 as INT pin, active low
    let pin_int: IntPin = pins.gpio8.into_pull_up_input();
    pin_int.set_interrupt_enabled(Interrupt::EdgeLow, true);
    INT_PIN.replace(Some(pin_int));

    unsafe {
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    let mut controller = Controller::new(spi, pin_cs, timer, &CAN_RX);
    controller.initialize("125KBPS").unwrap();

    let id = StandardId::new(0x123).unwrap();
    let payload = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    let mut delay = timer;

    loop {
        let _ = controller.send(id, &payload);

        if let Ok(Some(_frame)) = controller.recv(id, &CLOCK) {
            // application processing of the received frame
        }

        embedded_hal::blocking::delay::DelayMs::<u32>::delay_ms(&mut delay, 1000);
    }
}

#[interrupt]
fn IO_IRQ_BANK0() {
    INT_PIN.access(|pin| {
        if let Some(pin) = pin {
            if pin.interrupt_status(Interrupt::EdgeLow) {
                pin.clear_interrupt(Interrupt::EdgeLow);
                CAN_RX.on_interrupt();
            }
        }
    });
}
