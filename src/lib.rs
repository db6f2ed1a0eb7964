#![no_std]

//! 中断驱动的按钮手势识别。
//!
//! 每个按钮对应一条 GPIO 线，固件为每种手势注册一个回调：
//! 单击、双击、长按、超长按和保持。边沿中断先经过共享定时器消抖，
//! 确认后的按下/释放再交给每个按钮自己的分类逻辑。
//!
//! 所有入口都经过 [`ButtonManager::dispatch`]，它不可重入，
//! 回调在其中同步执行。在 embassy 上可以直接使用 [`runtime::Runner`]。

mod fmt;

mod button;
mod classifier;
pub mod config;
mod debounce;
pub mod error;
pub mod gpio;
pub mod hal;
mod registry;
pub mod runtime;

pub use config::*;
pub use error::Error;
pub use hal::{ButtonTimer, DebounceTimer, GpioService, TimerService};
pub use registry::ButtonManager;

/// GPIO 编号，同时是按钮的主键。
pub type Gpio = u8;

/// 手势回调，参数为触发的 GPIO 编号。在中断（或分发）上下文中同步执行。
pub type Handler = fn(Gpio);

/// 五种互斥的手势。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Single,
    Double,
    Long,
    VeryLong,
    Hold,
}

impl Gesture {
    pub const COUNT: usize = 5;

    pub(crate) fn index(self) -> usize {
        match self {
            Gesture::Single => 0,
            Gesture::Double => 1,
            Gesture::Long => 2,
            Gesture::VeryLong => 3,
            Gesture::Hold => 4,
        }
    }
}

/// 原始手势编号：1 单击，2 双击，3 长按，4 超长按，5 保持。
impl TryFrom<u8> for Gesture {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Gesture::Single),
            2 => Ok(Gesture::Double),
            3 => Ok(Gesture::Long),
            4 => Ok(Gesture::VeryLong),
            5 => Ok(Gesture::Hold),
            other => Err(Error::InvalidKind(other)),
        }
    }
}

/// 一次被识别出的手势。
///
/// `gesture` 是分类结果本身；实际执行的回调可能按
/// 超长按 → 长按 → 单击 的顺序回退。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub gpio: Gpio,
    pub gesture: Gesture,
}

/// 交给 [`ButtonManager::dispatch`] 的硬件事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// GPIO 边沿中断，方向不限。
    Edge(Gpio),
    /// 共享消抖定时器到期，`token` 为启动它的 GPIO。
    DebounceElapsed { timer: DebounceTimer, token: Gpio },
    /// 某个按钮的私有定时器到期。
    Elapsed { gpio: Gpio, timer: ButtonTimer },
}
