use embassy_time::Duration;

use crate::gpio::ActiveLevel;
use crate::Gpio;

/// 定义按钮手势识别的通用配置参数。
///
/// 这个结构体允许用户精细调整各种时间相关的行为，
/// 例如消抖、双击窗口以及长按、超长按和保持的阈值。
/// 所有阈值都是严格比较：按下时长必须 *超过* 阈值才算命中。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// 消抖持续时间。
    ///
    /// 每次边沿中断后，共享的消抖定时器在此时长后重新采样引脚，
    /// 电平未保持的边沿被视为抖动并丢弃。
    pub debounce: Duration,

    /// 双击时间窗口。
    ///
    /// 只有注册了双击回调时才生效：第一次短按释放后在此窗口内等待第二次短按，
    /// 窗口结束仍未等到则按单击处理。
    pub double_press_window: Duration,

    /// 长按阈值，在释放时判定。
    pub long_press: Duration,

    /// 超长按阈值，在释放时判定。
    pub very_long_press: Duration,

    /// 保持阈值。
    ///
    /// 按钮持续按下超过此时长时，不等释放直接触发保持回调。
    pub hold: Duration,

    /// 按钮按下时的有效电平。`ActiveLevel::Low` 时启用内部上拉。
    pub active_level: ActiveLevel,

    /// 保留引脚：管理器只配置上拉和中断，从不使能或禁用该引脚。
    pub reserved_gpio: Option<Gpio>,

    /// 保持回调触发后，是否跳过同一次按压在释放时的分类。
    pub hold_suppresses_release: bool,
}

impl ButtonConfig {
    /// 按钮按下时对应的引脚电平是否为 `level`。
    pub fn is_pressed(&self, level: embedded_hal::digital::PinState) -> bool {
        self.active_level.is_active(level)
    }
}

impl Default for ButtonConfig {
    /// 提供一套合理的默认配置。
    ///
    /// - 消抖: 20ms (50Hz 采样)
    /// - 双击窗口: 400ms
    /// - 长按阈值: 450ms
    /// - 超长按阈值: 1200ms
    /// - 保持阈值: 10s
    fn default() -> Self {
        Self {
            debounce: Duration::from_hz(50),
            double_press_window: Duration::from_millis(400),
            long_press: Duration::from_millis(450),
            very_long_press: Duration::from_millis(1200),
            hold: Duration::from_millis(10_000),
            active_level: ActiveLevel::Low,
            reserved_gpio: Some(0),
            hold_suppresses_release: true,
        }
    }
}
