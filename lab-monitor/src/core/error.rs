use thiserror::Error;

/// Lounge domain errors
///
/// | 分类 | 变体 | 处理方式 |
/// |------|------|----------|
/// | 验证错误 | `Validation`, `NoOneInside` | 通知操作员，不修改状态 |
/// | 引用缺失 | `EquipmentNotFound` | 视为空操作 |
/// | 状态冲突 | `EquipmentOccupied` | 通知操作员 (可强制替换) |
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoungeError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("Equipment already has a running session: {0}")]
    EquipmentOccupied(String),

    #[error("No one inside to exit")]
    NoOneInside,
}

impl LoungeError {
    /// Whether the error is a referential miss that callers treat as a no-op
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoungeError::EquipmentNotFound(_))
    }
}

pub type LoungeResult<T> = std::result::Result<T, LoungeError>;
