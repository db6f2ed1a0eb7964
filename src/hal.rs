//! 管理器依赖的外部服务。
//!
//! GPIO 外设驱动和硬件定时器外设都不在本库之内，
//! 平台通过实现这两个 trait 把它们交给 [`ButtonManager`](crate::ButtonManager)。
//! 本库假定这些原语总是成功。

use embassy_time::Duration;
use embedded_hal::digital::PinState;

use crate::Gpio;

/// GPIO 外设抽象。
pub trait GpioService {
    /// 把引脚配置为输入。
    fn enable_input(&mut self, gpio: Gpio);

    fn set_pull_up(&mut self, gpio: Gpio, enabled: bool);

    /// 同步读取引脚电平。
    fn read(&mut self, gpio: Gpio) -> PinState;

    /// 打开或关闭该引脚的双边沿（上升+下降）中断。
    ///
    /// 中断触发时平台应把 GPIO 编号交给管理器，
    /// 即 `Event::Edge(gpio)`，或在使用 [`Runner`](crate::runtime::Runner) 时写入中断队列。
    fn set_interrupt(&mut self, gpio: Gpio, enabled: bool);

    fn disable(&mut self, gpio: Gpio);
}

/// 全局共享的两个消抖定时器外设。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceTimer {
    /// 下降沿（按下）消抖。
    Down,
    /// 上升沿（释放）消抖。
    Up,
}

impl DebounceTimer {
    pub(crate) const ALL: [DebounceTimer; 2] = [DebounceTimer::Down, DebounceTimer::Up];

    pub(crate) fn index(self) -> usize {
        match self {
            DebounceTimer::Down => 0,
            DebounceTimer::Up => 1,
        }
    }
}

/// 每个按钮私有的两个单次定时器。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTimer {
    /// 按下后开始计时，到期时若仍按着则触发保持手势。
    Hold,
    /// 第一次短按释放后开始计时，到期时触发单击。
    Press,
}

impl ButtonTimer {
    pub(crate) fn index(self) -> usize {
        match self {
            ButtonTimer::Hold => 0,
            ButtonTimer::Press => 1,
        }
    }
}

/// 硬件定时器抽象。
///
/// 所有定时器都是单次的。到期时平台应把对应的 [`Event`](crate::Event)
/// 交给管理器：消抖定时器带回启动时给出的 `token`，
/// 按钮定时器带回 GPIO 编号和定时器种类。
pub trait TimerService {
    /// 设置共享消抖定时器的周期。在注册第一个按钮时调用。
    fn configure_debounce(&mut self, timer: DebounceTimer, period: Duration);

    /// 启动共享消抖定时器。若已在运行，则以新的 `token` 重新开始计时。
    fn start_debounce(&mut self, timer: DebounceTimer, token: Gpio);

    fn stop_debounce(&mut self, timer: DebounceTimer);

    /// 启动（或重新启动）某个按钮的私有定时器。
    fn arm(&mut self, gpio: Gpio, timer: ButtonTimer, after: Duration);

    fn disarm(&mut self, gpio: Gpio, timer: ButtonTimer);
}
