//! 共享消抖定时器的调度。
//!
//! 硬件上只有两个消抖定时器（按下一个、释放一个），所有按钮共用。
//! 每次启动都把触发的 GPIO 作为 token 交给定时器，到期时随事件带回，
//! 所以到期事件总能对应到正确的按钮。同一方向上，另一个按钮的边沿
//! 会重新启动定时器并替换掉之前的 token，被替换的那次采样直接作废。

use crate::config::ButtonConfig;
use crate::hal::{DebounceTimer, GpioService, TimerService};
use crate::Gpio;

/// 消抖确认后的电平跳变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Pressed(Gpio),
    Released(Gpio),
}

#[derive(Debug, Default)]
pub(crate) struct DebounceScheduler {
    /// 每个消抖定时器当前等待采样的 GPIO。
    in_flight: [Option<Gpio>; 2],
}

impl DebounceScheduler {
    /// 边沿中断：读取当前电平，按下则启动下降沿定时器，否则启动上升沿定时器。
    pub(crate) fn on_edge<G: GpioService, T: TimerService>(
        &mut self,
        gpio: Gpio,
        config: &ButtonConfig,
        pins: &mut G,
        timers: &mut T,
    ) {
        let timer = if config.is_pressed(pins.read(gpio)) {
            DebounceTimer::Down
        } else {
            DebounceTimer::Up
        };

        let slot = &mut self.in_flight[timer.index()];
        if let Some(previous) = slot.replace(gpio) {
            if previous != gpio {
                warn!("gpio {}: pending {:?} debounce of gpio {} superseded", gpio, timer, previous);
            }
        }
        timers.start_debounce(timer, gpio);
    }

    /// 消抖定时器到期：重新采样，电平保持则确认跳变，否则视为抖动丢弃。
    pub(crate) fn on_elapsed<G: GpioService, T: TimerService>(
        &mut self,
        timer: DebounceTimer,
        token: Gpio,
        config: &ButtonConfig,
        pins: &mut G,
        timers: &mut T,
    ) -> Option<Transition> {
        let slot = &mut self.in_flight[timer.index()];
        if *slot != Some(token) {
            trace!("gpio {}: stale {:?} debounce dropped", token, timer);
            return None;
        }
        *slot = None;
        timers.stop_debounce(timer);

        let pressed = config.is_pressed(pins.read(token));
        match (timer, pressed) {
            (DebounceTimer::Down, true) => Some(Transition::Pressed(token)),
            (DebounceTimer::Up, false) => Some(Transition::Released(token)),
            _ => {
                trace!("gpio {}: bounce discarded", token);
                None
            }
        }
    }

    /// 按钮注销时作废它所有未完成的消抖采样。
    pub(crate) fn forget<T: TimerService>(&mut self, gpio: Gpio, timers: &mut T) {
        for timer in DebounceTimer::ALL {
            let slot = &mut self.in_flight[timer.index()];
            if *slot == Some(gpio) {
                *slot = None;
                timers.stop_debounce(timer);
            }
        }
    }
}

