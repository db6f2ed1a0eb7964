//! 基于 embassy 的运行时。
//!
//! 在 embassy 上，硬件定时器由 [`DeadlineTimers`] 模拟为一组截止时间，
//! 中断通过 [`IrqChannel`] 排队，[`Runner`] 在一个任务里串行分发所有事件，
//! 并把识别出的手势广播给异步订阅者。

use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver},
    pubsub::{ImmediatePublisher, PubSubChannel, Subscriber},
};
use embassy_time::{Duration, Instant, Timer};

use crate::config::ButtonConfig;
use crate::hal::{ButtonTimer, DebounceTimer, GpioService, TimerService};
use crate::registry::ButtonManager;
use crate::{Event, GestureEvent, Gpio};

/// 边沿中断队列。中断处理函数里调用 `try_send(gpio)` 即可，队列满时该边沿丢失。
pub type IrqChannel<const CAP: usize> = Channel<CriticalSectionRawMutex, Gpio, CAP>;

pub type GestureChannel<const CAP: usize, const SUBS: usize, const PUBS: usize> =
    PubSubChannel<CriticalSectionRawMutex, GestureEvent, CAP, SUBS, PUBS>;
pub type GestureSubscriber<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> =
    Subscriber<'a, CriticalSectionRawMutex, GestureEvent, CAP, SUBS, PUBS>;
type GesturePublisher<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> =
    ImmediatePublisher<'a, CriticalSectionRawMutex, GestureEvent, CAP, SUBS, PUBS>;

/// 以截止时间实现的 [`TimerService`]。
///
/// 它本身不会到期，由 [`Runner`] 通过 [`next`](Self::next) 查询最早的截止时间并等待。
pub struct DeadlineTimers<const PINS: usize> {
    debounce_period: [Duration; 2],
    debounce: [Option<(Instant, Gpio)>; 2],
    buttons: [[Option<Instant>; 2]; PINS],
}

impl<const PINS: usize> DeadlineTimers<PINS> {
    pub fn new() -> Self {
        Self {
            debounce_period: [Duration::from_ticks(0); 2],
            debounce: [None; 2],
            buttons: [[None; 2]; PINS],
        }
    }

    /// 最早到期的定时器及其到期时要分发的事件。
    pub fn next(&self) -> Option<(Instant, Event)> {
        let debounce = DebounceTimer::ALL.into_iter().filter_map(|timer| {
            self.debounce[timer.index()]
                .map(|(at, token)| (at, Event::DebounceElapsed { timer, token }))
        });
        let buttons = self.buttons.iter().enumerate().flat_map(|(gpio, slots)| {
            [ButtonTimer::Hold, ButtonTimer::Press]
                .into_iter()
                .filter_map(move |timer| {
                    slots[timer.index()].map(|at| {
                        let gpio = gpio as Gpio;
                        (at, Event::Elapsed { gpio, timer })
                    })
                })
        });
        debounce.chain(buttons).min_by_key(|(at, _)| *at)
    }

    /// 清除已到期的定时器，单次定时器到期后即失效。
    pub fn take(&mut self, event: Event) {
        match event {
            Event::DebounceElapsed { timer, .. } => self.debounce[timer.index()] = None,
            Event::Elapsed { gpio, timer } => {
                if let Some(slots) = self.buttons.get_mut(usize::from(gpio)) {
                    slots[timer.index()] = None;
                }
            }
            Event::Edge(_) => {}
        }
    }

    pub fn is_armed(&self, gpio: Gpio, timer: ButtonTimer) -> bool {
        self.buttons
            .get(usize::from(gpio))
            .is_some_and(|slots| slots[timer.index()].is_some())
    }
}

impl<const PINS: usize> Default for DeadlineTimers<PINS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PINS: usize> TimerService for DeadlineTimers<PINS> {
    fn configure_debounce(&mut self, timer: DebounceTimer, period: Duration) {
        self.debounce_period[timer.index()] = period;
    }

    fn start_debounce(&mut self, timer: DebounceTimer, token: Gpio) {
        let at = Instant::now() + self.debounce_period[timer.index()];
        self.debounce[timer.index()] = Some((at, token));
    }

    fn stop_debounce(&mut self, timer: DebounceTimer) {
        self.debounce[timer.index()] = None;
    }

    fn arm(&mut self, gpio: Gpio, timer: ButtonTimer, after: Duration) {
        if let Some(slots) = self.buttons.get_mut(usize::from(gpio)) {
            slots[timer.index()] = Some(Instant::now() + after);
        }
    }

    fn disarm(&mut self, gpio: Gpio, timer: ButtonTimer) {
        if let Some(slots) = self.buttons.get_mut(usize::from(gpio)) {
            slots[timer.index()] = None;
        }
    }
}

/// 【后台驱动器】拥有按钮管理器，提供 run 方法以在后台任务中运行。
///
/// 按钮应在 `run` 之前通过 [`manager_mut`](Self::manager_mut) 注册并设置回调。
pub struct Runner<
    'a,
    G: GpioService,
    const PINS: usize,
    const IRQ_CAP: usize,
    const CAP: usize,
    const SUBS: usize,
    const PUBS: usize,
> {
    manager: ButtonManager<G, DeadlineTimers<PINS>, PINS>,
    irq: Receiver<'a, CriticalSectionRawMutex, Gpio, IRQ_CAP>,
    gestures: GesturePublisher<'a, CAP, SUBS, PUBS>,
}

impl<
        'a,
        G: GpioService,
        const PINS: usize,
        const IRQ_CAP: usize,
        const CAP: usize,
        const SUBS: usize,
        const PUBS: usize,
    > Runner<'a, G, PINS, IRQ_CAP, CAP, SUBS, PUBS>
{
    /// # 参数
    /// * `pins`: 平台的 GPIO 服务。
    /// * `config`: 手势时间配置。
    /// * `irq`: 边沿中断队列，中断处理函数向其中写入 GPIO 编号。
    /// * `gestures`: 识别出的手势会广播到这个通道。
    pub fn new(
        pins: G,
        config: ButtonConfig,
        irq: &'a IrqChannel<IRQ_CAP>,
        gestures: &'a GestureChannel<CAP, SUBS, PUBS>,
    ) -> Self {
        Self {
            manager: ButtonManager::new(pins, DeadlineTimers::new(), config),
            irq: irq.receiver(),
            gestures: gestures.immediate_publisher(),
        }
    }

    pub fn manager(&self) -> &ButtonManager<G, DeadlineTimers<PINS>, PINS> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ButtonManager<G, DeadlineTimers<PINS>, PINS> {
        &mut self.manager
    }

    /// 等待下一个边沿或定时器到期，并分发它。
    pub async fn step(&mut self) -> Option<GestureEvent> {
        let event = match self.manager.timers().next() {
            Some((deadline, expiry)) => {
                match select(self.irq.receive(), Timer::at(deadline)).await {
                    Either::First(gpio) => Event::Edge(gpio),
                    Either::Second(()) => {
                        self.manager.timers_mut().take(expiry);
                        expiry
                    }
                }
            }
            None => Event::Edge(self.irq.receive().await),
        };

        let gesture = self.manager.dispatch(event, Instant::now());
        if let Some(gesture) = gesture {
            self.gestures.publish_immediate(gesture);
        }
        gesture
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.step().await;
        }
    }
}
