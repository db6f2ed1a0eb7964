use core::fmt;

use crate::Gpio;

/// 注册接口返回的错误。
///
/// 所有错误都是本地、同步且非致命的，由调用者决定重试还是放弃。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 该 GPIO 上已经注册了按钮。
    AlreadyExists(Gpio),
    /// 该 GPIO 上没有注册按钮。
    NotFound(Gpio),
    /// 手势编号不在 1..=5 之内。
    InvalidKind(u8),
    /// GPIO 编号超出了管理器的引脚容量。
    PinOutOfRange(Gpio),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists(gpio) => write!(f, "button already registered on gpio {gpio}"),
            Self::NotFound(gpio) => write!(f, "no button registered on gpio {gpio}"),
            Self::InvalidKind(code) => write!(f, "invalid gesture kind {code}"),
            Self::PinOutOfRange(gpio) => write!(f, "gpio {gpio} exceeds pin capacity"),
        }
    }
}
