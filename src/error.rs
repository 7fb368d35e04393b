/// 识别引擎的错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 特征向量长度与图库的 face_length 不一致
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// 图库为空，无法计算均值或子空间
    #[error("gallery is empty")]
    EmptyGallery,

    /// 所有特征脸的范数都退化为 0，子空间未定义
    #[error("subspace is degenerate, every eigenface has zero norm")]
    DegenerateSubspace,

    /// 特征向量中包含 NaN 或无穷大
    #[error("face {id:?} contains non-finite components")]
    NonFinite { id: String },

    /// 特征分解的输入不是方阵
    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("eigen decomposition did not converge within {max_iter} iterations")]
    NoConvergence { max_iter: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
