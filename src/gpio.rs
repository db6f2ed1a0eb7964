use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{InputPin, PinState};
use embedded_hal_async::digital::Wait;

use crate::Gpio;

/// 边沿等待出错后重试前的等待时间。
const EDGE_RETRY_DELAY: Duration = Duration::from_millis(10);

/// 定义GPIO按钮的有效电平。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveLevel {
    /// 低电平有效（例如，使用上拉电阻，按下时引脚接地）。
    Low,
    /// 高电平有效（例如，使用下拉电阻，按下时引脚接VCC）。
    High,
}

impl ActiveLevel {
    /// 引脚电平 `level` 是否表示“按下”。
    pub fn is_active(self, level: PinState) -> bool {
        matches!(
            (self, level),
            (ActiveLevel::Low, PinState::Low) | (ActiveLevel::High, PinState::High)
        )
    }

    /// 该接法是否需要内部上拉。
    pub fn needs_pull_up(self) -> bool {
        self == ActiveLevel::Low
    }
}

/// 把一个支持异步边沿等待的引脚桥接到 [`Runner`](crate::runtime::Runner) 的中断队列。
///
/// 适用于没有裸中断回调、只能通过 `Wait` 感知边沿的平台：
/// 每检测到一个边沿（上升或下降）就把 GPIO 编号送进队列，
/// 效果等同于在边沿中断里调用 `try_send`。
pub struct EdgeWatcher<'a, P: InputPin + Wait, const CAP: usize> {
    pin: P,
    gpio: Gpio,
    irq: Sender<'a, CriticalSectionRawMutex, Gpio, CAP>,
}

impl<'a, P, const CAP: usize> EdgeWatcher<'a, P, CAP>
where
    P: InputPin + Wait,
{
    /// # 参数
    /// * `pin`: 按钮所在的引脚。
    /// * `gpio`: 该引脚在管理器中注册时使用的编号。
    /// * `irq`: 中断队列的发送端，通常来自 `IrqChannel::sender()`。
    pub fn new(pin: P, gpio: Gpio, irq: Sender<'a, CriticalSectionRawMutex, Gpio, CAP>) -> Self {
        Self { pin, gpio, irq }
    }

    pub async fn run(mut self) -> ! {
        loop {
            match self.pin.wait_for_any_edge().await {
                Ok(()) => self.irq.send(self.gpio).await,
                Err(_) => {
                    warn!("gpio {}: edge wait failed", self.gpio);
                    Timer::after(EDGE_RETRY_DELAY).await;
                }
            }
        }
    }
}
