use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// 一张人脸的特征向量，以及它在当前子空间中的投影系数
///
/// 两个 `Face` 是否相等只取决于 `id`，与向量内容无关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    id: String,
    vector: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coefficients: Option<Vec<f64>>,
}

impl Face {
    /// 长度检查由图库负责，这里只保存数据
    pub fn new(id: impl Into<String>, vector: impl Into<Vec<f64>>) -> Self {
        Self { id: id.into(), vector: vector.into(), coefficients: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    /// 尚未投影时返回 `None`
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    /// 覆盖投影系数，不检查长度
    pub fn set_coefficients(&mut self, coefficients: Vec<f64>) {
        self.coefficients = Some(coefficients);
    }

    /// 复制 id 和特征向量，不复制投影系数
    pub fn deep_copy(&self) -> Self {
        Self::new(self.id.clone(), self.vector.clone())
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.vector.iter().all(|x| x.is_finite())
    }

    /// 逐分量减去 `other`，返回新的 Face
    pub(crate) fn subtract(&self, other: &[f64]) -> Self {
        let mut face = self.deep_copy();
        face.vector.iter_mut().zip(other).for_each(|(a, b)| *a -= b);
        face
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Face {}

impl Hash for Face {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
