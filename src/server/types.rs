use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::Identification;

/// 添加人脸请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollRequest {
    /// 人脸唯一标识
    pub id: String,
    /// 特征向量
    pub vector: Vec<f64>,
    /// 如果 id 已存在，是否覆盖旧的记录
    #[schema(default = false)]
    #[serde(default)]
    pub overwrite: bool,
}

/// 移除人脸请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    pub id: String,
}

/// 修改图库后的响应
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryUpdateResponse {
    /// 图库是否发生了变化
    pub changed: bool,
    /// 当前图库大小
    pub size: usize,
}

/// 识别请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentifyRequest {
    /// 待识别的特征向量
    pub vector: Vec<f64>,
    /// 额外返回距离最近的人脸数量
    #[schema(default = 0)]
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Candidate {
    pub id: String,
    /// 投影系数之间的欧氏距离平方
    pub distance: f64,
}

impl From<Identification<'_>> for Candidate {
    fn from(m: Identification<'_>) -> Self {
        Self { id: m.face.id().to_owned(), distance: m.distance }
    }
}

/// 识别响应
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentifyResponse {
    /// 识别耗时，单位为毫秒
    pub time: f64,
    /// 阈值内距离最近的人脸，没有则为 null
    pub result: Option<Candidate>,
    pub nearest: Vec<Candidate>,
}

/// 图库信息
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryResponse {
    pub face_length: usize,
    pub rank: usize,
    pub threshold: f64,
    /// 当前特征脸数量
    pub eigenfaces: usize,
    /// 按添加顺序排列的人脸 id
    pub faces: Vec<String>,
}
