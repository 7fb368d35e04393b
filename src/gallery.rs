use log::debug;

use crate::error::{Error, Result};
use crate::face::Face;

/// 训练用人脸图库
///
/// 每次 `enroll` / `withdraw` 之后都会同步重算均值脸和中心化后的人脸，
/// 因此 `mean_face` 与 `centered_faces` 总是和 `faces` 一致
#[derive(Debug, Clone)]
pub struct TrainingGallery {
    face_length: usize,
    faces: Vec<Face>,
    mean: Option<Face>,
    centered: Vec<Face>,
}

impl TrainingGallery {
    pub const MEAN_ID: &'static str = "avg";

    pub fn new(face_length: usize) -> Self {
        Self { face_length, faces: vec![], mean: None, centered: vec![] }
    }

    pub fn face_length(&self) -> usize {
        self.face_length
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// 按插入顺序返回所有人脸
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// 按插入顺序返回减去均值脸后的人脸
    pub fn centered_faces(&self) -> &[Face] {
        &self.centered
    }

    /// 图库为空时返回 `None`
    pub fn mean_face(&self) -> Option<&Face> {
        self.mean.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Face> {
        self.faces.iter().find(|face| face.id() == id)
    }

    /// 添加一张人脸，长度不符或包含非有限值时拒绝，图库保持不变
    pub fn enroll(&mut self, face: Face) -> Result<()> {
        self.check(&face)?;
        self.faces.push(face);
        self.recompute();
        Ok(())
    }

    /// 批量添加人脸，最后只重算一次均值
    ///
    /// 任何一张人脸不合法时全部放弃，图库保持不变。返回添加的数量
    pub fn enroll_all(&mut self, faces: impl IntoIterator<Item = Face>) -> Result<usize> {
        let before = self.faces.len();
        for face in faces {
            if let Err(err) = self.check(&face) {
                self.faces.truncate(before);
                return Err(err);
            }
            self.faces.push(face);
        }
        let count = self.faces.len() - before;
        if count > 0 {
            self.recompute();
        }
        Ok(count)
    }

    /// 移除第一张 id 相同的人脸，不存在时什么也不做
    ///
    /// 返回是否真的移除了人脸
    pub fn withdraw(&mut self, face: &Face) -> bool {
        let Some(pos) = self.faces.iter().position(|f| f == face) else {
            debug!("face {:?} is not in gallery", face.id());
            return false;
        };
        self.faces.remove(pos);
        self.recompute();
        true
    }

    /// 返回给定人脸减去当前均值脸后的副本
    ///
    /// 不会重算均值，也不会修改图库，因此可以用来中心化待识别的人脸
    pub fn center_faces(&self, faces: &[Face]) -> Result<Vec<Face>> {
        let mean = self.mean.as_ref().ok_or(Error::EmptyGallery)?;
        faces
            .iter()
            .map(|face| {
                self.check(face)?;
                Ok(face.subtract(mean.vector()))
            })
            .collect()
    }

    /// 写入每张人脸的投影系数，顺序与 `faces` 相同
    pub(crate) fn assign_coefficients(&mut self, coefficients: Vec<Vec<f64>>) {
        debug_assert_eq!(coefficients.len(), self.faces.len());
        for ((face, centered), coef) in
            self.faces.iter_mut().zip(self.centered.iter_mut()).zip(coefficients)
        {
            centered.set_coefficients(coef.clone());
            face.set_coefficients(coef);
        }
    }

    fn check(&self, face: &Face) -> Result<()> {
        if face.len() != self.face_length {
            return Err(Error::DimensionMismatch { expected: self.face_length, got: face.len() });
        }
        if !face.is_finite() {
            return Err(Error::NonFinite { id: face.id().to_owned() });
        }
        Ok(())
    }

    fn recompute(&mut self) {
        self.mean = self.calculate_mean();
        self.centered = match &self.mean {
            Some(mean) => self.faces.iter().map(|face| face.subtract(mean.vector())).collect(),
            None => vec![],
        };
    }

    fn calculate_mean(&self) -> Option<Face> {
        if self.faces.is_empty() {
            return None;
        }
        let mut sum = vec![0.0; self.face_length];
        for face in &self.faces {
            sum.iter_mut().zip(face.vector()).for_each(|(s, x)| *s += x);
        }
        let n = self.faces.len() as f64;
        sum.iter_mut().for_each(|s| *s /= n);
        Some(Face::new(Self::MEAN_ID, sum))
    }
}
