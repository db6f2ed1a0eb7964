//! 每个按钮的手势分类。
//!
//! 状态机：`Idle → 确认按下（保持定时器运行）→ 确认释放（分类）→ Idle`，
//! 注册了双击回调时，短按释放后可能经过 `等待第二次按下` 再回到 `Idle`。

use embassy_time::{Duration, Instant};

use crate::button::Button;
use crate::config::ButtonConfig;
use crate::hal::{ButtonTimer, TimerService};
use crate::Gesture;

impl Button {
    /// 消抖确认按下：启动保持定时器并记录按下时间。
    pub(crate) fn on_confirmed_press<T: TimerService>(
        &mut self,
        now: Instant,
        config: &ButtonConfig,
        timers: &mut T,
    ) {
        timers.arm(self.gpio, ButtonTimer::Hold, config.hold);
        self.pressed_at = Some(now);
        self.hold_fired = false;
        trace!("gpio {}: pressed", self.gpio);
    }

    /// 消抖确认释放：停止保持定时器并按按下时长分类。
    ///
    /// 返回立即触发的手势；进入双击等待时返回 `None`。
    pub(crate) fn on_confirmed_release<T: TimerService>(
        &mut self,
        now: Instant,
        config: &ButtonConfig,
        timers: &mut T,
    ) -> Option<Gesture> {
        timers.disarm(self.gpio, ButtonTimer::Hold);

        let Some(pressed_at) = self.pressed_at.take() else {
            trace!("gpio {}: release without confirmed press", self.gpio);
            return None;
        };

        if core::mem::take(&mut self.hold_fired) && config.hold_suppresses_release {
            debug!("gpio {}: release after hold, not classified", self.gpio);
            return None;
        }

        self.classify(now.saturating_duration_since(pressed_at), config, timers)
    }

    fn classify<T: TimerService>(
        &mut self,
        elapsed: Duration,
        config: &ButtonConfig,
        timers: &mut T,
    ) -> Option<Gesture> {
        if elapsed > config.very_long_press {
            self.press_count = 0;
            self.invoke(&[Gesture::VeryLong, Gesture::Long, Gesture::Single]);
            Some(Gesture::VeryLong)
        } else if elapsed > config.long_press {
            self.press_count = 0;
            self.invoke(&[Gesture::Long, Gesture::Single]);
            Some(Gesture::Long)
        } else if self.has_handler(Gesture::Double) {
            self.press_count = self.press_count.saturating_add(1);
            if self.press_count > 1 {
                timers.disarm(self.gpio, ButtonTimer::Press);
                self.press_count = 0;
                self.invoke(&[Gesture::Double]);
                Some(Gesture::Double)
            } else {
                timers.arm(self.gpio, ButtonTimer::Press, config.double_press_window);
                None
            }
        } else {
            self.invoke(&[Gesture::Single]);
            Some(Gesture::Single)
        }
    }

    /// 双击窗口结束仍未等到第二次按下。
    ///
    /// 窗口内发生的长按、超长按或保持会清零计数但不取消窗口，
    /// 先前那次短按仍在窗口结束时按单击交付。
    pub(crate) fn on_press_window_elapsed(&mut self) -> Gesture {
        self.press_count = 0;
        self.invoke(&[Gesture::Single]);
        Gesture::Single
    }

    /// 保持定时器到期且按钮仍处于按下状态。
    pub(crate) fn on_hold_elapsed(&mut self) -> Gesture {
        self.press_count = 0;
        self.hold_fired = true;
        self.invoke(&[Gesture::Hold]);
        Gesture::Hold
    }
}
