use embassy_time::Instant;

use crate::button::Button;
use crate::config::ButtonConfig;
use crate::debounce::{DebounceScheduler, Transition};
use crate::error::Error;
use crate::hal::{ButtonTimer, DebounceTimer, GpioService, TimerService};
use crate::{Event, Gesture, GestureEvent, Gpio, Handler};

/// 按钮注册表和事件分发入口。
///
/// 按钮以 GPIO 编号为下标保存在定长数组中，`PINS` 是可注册的最大编号加一。
/// 所有内存在构造时一次分配完毕，[`dispatch`](Self::dispatch) 路径上不再分配。
///
/// # 执行上下文
/// `dispatch` 必须串行调用（同一时刻只有一个中断/任务进入），
/// 回调在其中同步执行，慢回调会推迟后续事件的处理。
pub struct ButtonManager<G: GpioService, T: TimerService, const PINS: usize> {
    pins: G,
    timers: T,
    config: ButtonConfig,
    buttons: [Option<Button>; PINS],
    debounce: DebounceScheduler,
    registered: usize,
}

impl<G: GpioService, T: TimerService, const PINS: usize> ButtonManager<G, T, PINS> {
    pub fn new(pins: G, timers: T, config: ButtonConfig) -> Self {
        Self {
            pins,
            timers,
            config,
            buttons: [None; PINS],
            debounce: DebounceScheduler::default(),
            registered: 0,
        }
    }

    /// 在 `gpio` 上注册一个按钮。
    ///
    /// 单击回调默认为诊断空回调，其余手势默认未设置。
    /// 引脚被配置为输入并监听双边沿中断；从零个按钮变为一个时还会初始化两个共享消抖定时器。
    pub fn register(&mut self, gpio: Gpio) -> Result<(), Error> {
        let slot = self
            .buttons
            .get_mut(usize::from(gpio))
            .ok_or(Error::PinOutOfRange(gpio))?;
        if slot.is_some() {
            return Err(Error::AlreadyExists(gpio));
        }

        if self.registered == 0 {
            for timer in DebounceTimer::ALL {
                self.timers.stop_debounce(timer);
                self.timers.configure_debounce(timer, self.config.debounce);
            }
        }

        *slot = Some(Button::new(gpio));
        self.registered += 1;

        if !self.is_reserved(gpio) {
            self.pins.enable_input(gpio);
        }
        self.pins
            .set_pull_up(gpio, self.config.active_level.needs_pull_up());
        self.pins.set_interrupt(gpio, true);

        self.timers.disarm(gpio, ButtonTimer::Hold);
        self.timers.disarm(gpio, ButtonTimer::Press);

        debug!("gpio {}: button registered", gpio);
        Ok(())
    }

    /// 设置某种手势的回调。
    ///
    /// 给单击传入 `None` 会恢复为诊断空回调；其余手势传入 `None` 表示未设置，
    /// 分类时回退到更粗的手势。
    pub fn set_handler(
        &mut self,
        gpio: Gpio,
        gesture: Gesture,
        handler: Option<Handler>,
    ) -> Result<(), Error> {
        let button = self.button_mut(gpio).ok_or(Error::NotFound(gpio))?;
        button.set_handler(gesture, handler);
        Ok(())
    }

    /// 以原始编号（1..=5）设置回调。先检查按钮是否存在，再检查编号。
    pub fn set_handler_code(
        &mut self,
        gpio: Gpio,
        code: u8,
        handler: Option<Handler>,
    ) -> Result<(), Error> {
        let button = self.button_mut(gpio).ok_or(Error::NotFound(gpio))?;
        button.set_handler(Gesture::try_from(code)?, handler);
        Ok(())
    }

    /// 注销 `gpio` 上的按钮；不存在时什么也不做。
    ///
    /// 停止它的私有定时器和未完成的消抖采样，关闭中断，并禁用引脚（保留引脚除外）。
    pub fn unregister(&mut self, gpio: Gpio) {
        let Some(button) = self
            .buttons
            .get_mut(usize::from(gpio))
            .and_then(Option::take)
        else {
            return;
        };
        self.registered -= 1;

        self.timers.disarm(button.gpio, ButtonTimer::Hold);
        self.timers.disarm(button.gpio, ButtonTimer::Press);
        self.debounce.forget(button.gpio, &mut self.timers);
        self.pins.set_interrupt(button.gpio, false);
        if !self.is_reserved(button.gpio) {
            self.pins.disable(button.gpio);
        }

        debug!("gpio {}: button unregistered", gpio);
    }

    pub fn is_registered(&self, gpio: Gpio) -> bool {
        matches!(self.buttons.get(usize::from(gpio)), Some(Some(_)))
    }

    /// 已注册的按钮数量。
    pub fn len(&self) -> usize {
        self.registered
    }

    pub fn is_empty(&self) -> bool {
        self.registered == 0
    }

    /// 处理一个硬件事件，返回本次触发的手势（回调已在返回前执行）。
    ///
    /// `now` 是事件发生的时间，用于计算按下时长。
    pub fn dispatch(&mut self, event: Event, now: Instant) -> Option<GestureEvent> {
        let (gpio, gesture) = match event {
            Event::Edge(gpio) => {
                if self.is_registered(gpio) {
                    self.debounce
                        .on_edge(gpio, &self.config, &mut self.pins, &mut self.timers);
                }
                return None;
            }
            Event::DebounceElapsed { timer, token } => {
                let transition = self.debounce.on_elapsed(
                    timer,
                    token,
                    &self.config,
                    &mut self.pins,
                    &mut self.timers,
                )?;
                match transition {
                    Transition::Pressed(gpio) => {
                        let button = slot(&mut self.buttons, gpio)?;
                        button.on_confirmed_press(now, &self.config, &mut self.timers);
                        return None;
                    }
                    Transition::Released(gpio) => {
                        let button = slot(&mut self.buttons, gpio)?;
                        let gesture =
                            button.on_confirmed_release(now, &self.config, &mut self.timers)?;
                        (gpio, gesture)
                    }
                }
            }
            Event::Elapsed {
                gpio,
                timer: ButtonTimer::Hold,
            } => {
                let button = slot(&mut self.buttons, gpio)?;
                if !self.config.is_pressed(self.pins.read(gpio)) {
                    return None;
                }
                (gpio, button.on_hold_elapsed())
            }
            Event::Elapsed {
                gpio,
                timer: ButtonTimer::Press,
            } => {
                let button = slot(&mut self.buttons, gpio)?;
                (gpio, button.on_press_window_elapsed())
            }
        };

        info!("gpio {}: {:?}", gpio, gesture);
        Some(GestureEvent { gpio, gesture })
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// 获取 GPIO 服务的可变引用
    pub fn pins_mut(&mut self) -> &mut G {
        &mut self.pins
    }

    /// 获取定时器服务的不可变引用
    pub fn timers(&self) -> &T {
        &self.timers
    }

    /// 获取定时器服务的可变引用
    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    fn button_mut(&mut self, gpio: Gpio) -> Option<&mut Button> {
        slot(&mut self.buttons, gpio)
    }

    fn is_reserved(&self, gpio: Gpio) -> bool {
        self.config.reserved_gpio == Some(gpio)
    }
}

fn slot(buttons: &mut [Option<Button>], gpio: Gpio) -> Option<&mut Button> {
    buttons.get_mut(usize::from(gpio))?.as_mut()
}
