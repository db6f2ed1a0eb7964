#![allow(dead_code)]

use std::cell::RefCell;

use embassy_gesture_button::{
    ButtonConfig, ButtonManager, ButtonTimer, DebounceTimer, Event, Gesture, GestureEvent, Gpio,
    GpioService, Handler, TimerService,
};
use embassy_time::{Duration, Instant};
use embedded_hal::digital::PinState;

pub const PINS: usize = 16;

// --- Mock Hardware (模拟硬件) ---

pub struct MockPins {
    pub levels: [PinState; PINS],
    pub enabled: [bool; PINS],
    pub pull_up: [bool; PINS],
    pub interrupt: [bool; PINS],
}

impl MockPins {
    fn new() -> Self {
        Self {
            levels: [PinState::High; PINS],
            enabled: [false; PINS],
            pull_up: [false; PINS],
            interrupt: [false; PINS],
        }
    }
}

impl GpioService for MockPins {
    fn enable_input(&mut self, gpio: Gpio) {
        self.enabled[gpio as usize] = true;
    }

    fn set_pull_up(&mut self, gpio: Gpio, enabled: bool) {
        self.pull_up[gpio as usize] = enabled;
    }

    fn read(&mut self, gpio: Gpio) -> PinState {
        self.levels[gpio as usize]
    }

    fn set_interrupt(&mut self, gpio: Gpio, enabled: bool) {
        self.interrupt[gpio as usize] = enabled;
    }

    fn disable(&mut self, gpio: Gpio) {
        self.enabled[gpio as usize] = false;
    }
}

/// 时间由测试手动推进的定时器。
pub struct MockTimers {
    pub now: Instant,
    pub debounce_period: [Option<Duration>; 2],
    pub configured: usize,
    pub debounce: [Option<(Instant, Gpio)>; 2],
    pub armed: Vec<(Gpio, ButtonTimer, Instant)>,
}

impl MockTimers {
    fn new() -> Self {
        Self {
            now: Instant::from_millis(1_000),
            debounce_period: [None; 2],
            configured: 0,
            debounce: [None; 2],
            armed: Vec::new(),
        }
    }

    pub fn is_armed(&self, gpio: Gpio, timer: ButtonTimer) -> bool {
        self.armed.iter().any(|(g, t, _)| *g == gpio && *t == timer)
    }

    /// 在 `limit` 之前（含）最早到期的定时器，取出后即失效。
    fn take_due(&mut self, limit: Instant) -> Option<(Instant, Event)> {
        let debounce = [DebounceTimer::Down, DebounceTimer::Up]
            .into_iter()
            .enumerate()
            .filter_map(|(i, timer)| {
                self.debounce[i].map(|(at, token)| (at, Event::DebounceElapsed { timer, token }))
            });
        let buttons = self
            .armed
            .iter()
            .map(|(gpio, timer, at)| (*at, Event::Elapsed { gpio: *gpio, timer: *timer }));
        let (at, event) = debounce
            .chain(buttons)
            .filter(|(at, _)| *at <= limit)
            .min_by_key(|(at, _)| *at)?;

        match event {
            Event::DebounceElapsed { timer, .. } => self.stop_debounce(timer),
            Event::Elapsed { gpio, timer } => self.disarm(gpio, timer),
            Event::Edge(_) => {}
        }
        Some((at, event))
    }
}

fn debounce_index(timer: DebounceTimer) -> usize {
    match timer {
        DebounceTimer::Down => 0,
        DebounceTimer::Up => 1,
    }
}

impl TimerService for MockTimers {
    fn configure_debounce(&mut self, timer: DebounceTimer, period: Duration) {
        self.debounce_period[debounce_index(timer)] = Some(period);
        self.configured += 1;
    }

    fn start_debounce(&mut self, timer: DebounceTimer, token: Gpio) {
        let period = self.debounce_period[debounce_index(timer)]
            .expect("debounce timer started before it was configured");
        self.debounce[debounce_index(timer)] = Some((self.now + period, token));
    }

    fn stop_debounce(&mut self, timer: DebounceTimer) {
        self.debounce[debounce_index(timer)] = None;
    }

    fn arm(&mut self, gpio: Gpio, timer: ButtonTimer, after: Duration) {
        self.disarm(gpio, timer);
        self.armed.push((gpio, timer, self.now + after));
    }

    fn disarm(&mut self, gpio: Gpio, timer: ButtonTimer) {
        self.armed.retain(|(g, t, _)| !(*g == gpio && *t == timer));
    }
}

// --- Handler recording (回调记录) ---

thread_local! {
    static CALLS: RefCell<Vec<(Gpio, Gesture)>> = const { RefCell::new(Vec::new()) };
}

fn record(gpio: Gpio, gesture: Gesture) {
    CALLS.with(|calls| calls.borrow_mut().push((gpio, gesture)));
}

fn on_single(gpio: Gpio) {
    record(gpio, Gesture::Single);
}
fn on_double(gpio: Gpio) {
    record(gpio, Gesture::Double);
}
fn on_long(gpio: Gpio) {
    record(gpio, Gesture::Long);
}
fn on_very_long(gpio: Gpio) {
    record(gpio, Gesture::VeryLong);
}
fn on_hold(gpio: Gpio) {
    record(gpio, Gesture::Hold);
}

/// 记录到调用列表中的回调，调用时记录下回调自己对应的手势。
pub fn recorder(gesture: Gesture) -> Handler {
    match gesture {
        Gesture::Single => on_single,
        Gesture::Double => on_double,
        Gesture::Long => on_long,
        Gesture::VeryLong => on_very_long,
        Gesture::Hold => on_hold,
    }
}

/// 取出当前线程记录到的所有回调调用。
pub fn take_calls() -> Vec<(Gpio, Gesture)> {
    CALLS.with(|calls| calls.borrow_mut().drain(..).collect())
}

// --- Test Harness (测试工具) ---

pub struct Harness {
    pub manager: ButtonManager<MockPins, MockTimers, PINS>,
    pub events: Vec<GestureEvent>,
}

impl Harness {
    pub fn new(config: ButtonConfig) -> Self {
        take_calls();
        Self {
            manager: ButtonManager::new(MockPins::new(), MockTimers::new(), config),
            events: Vec::new(),
        }
    }

    /// 注册按钮并为 `gestures` 中的每种手势挂上记录回调。
    pub fn button(&mut self, gpio: Gpio, gestures: &[Gesture]) {
        self.manager.register(gpio).unwrap();
        for &gesture in gestures {
            self.manager
                .set_handler(gpio, gesture, Some(recorder(gesture)))
                .unwrap();
        }
    }

    pub fn now(&self) -> Instant {
        self.manager.timers().now
    }

    pub fn set_level(&mut self, gpio: Gpio, level: PinState) {
        self.manager.pins_mut().levels[gpio as usize] = level;
    }

    /// 改变电平并产生一次边沿中断。
    pub fn edge(&mut self, gpio: Gpio, level: PinState) {
        self.set_level(gpio, level);
        let now = self.now();
        let gesture = self.manager.dispatch(Event::Edge(gpio), now);
        assert_eq!(gesture, None, "edges never classify directly");
    }

    pub fn press(&mut self, gpio: Gpio) {
        self.edge(gpio, PinState::Low);
    }

    pub fn release(&mut self, gpio: Gpio) {
        self.edge(gpio, PinState::High);
    }

    /// 推进时间，按顺序分发期间到期的所有定时器。
    pub fn advance(&mut self, ms: u64) {
        let target = self.now() + Duration::from_millis(ms);
        while let Some((at, event)) = self.manager.timers_mut().take_due(target) {
            self.manager.timers_mut().now = at;
            if let Some(gesture) = self.manager.dispatch(event, at) {
                self.events.push(gesture);
            }
        }
        self.manager.timers_mut().now = target;
    }

    /// 按下 `held_ms` 后释放，并等待释放消抖完成。
    pub fn click(&mut self, gpio: Gpio, held_ms: u64) {
        self.press(gpio);
        self.advance(held_ms);
        self.release(gpio);
        self.advance(30);
    }

    pub fn gestures(&self) -> Vec<(Gpio, Gesture)> {
        self.events.iter().map(|e| (e.gpio, e.gesture)).collect()
    }
}
