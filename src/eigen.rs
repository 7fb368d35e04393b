use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::error::{Error, Result};

/// 方阵特征分解的结果
///
/// `vectors` 的第 i 列对应第 i 个特征值，不保证任何顺序
#[derive(Debug, Clone)]
pub struct Eigen {
    pub real: DVector<f64>,
    pub imag: DVector<f64>,
    pub vectors: DMatrix<f64>,
}

impl Eigen {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// 第 i 个特征值模的平方
    pub fn energy(&self, i: usize) -> f64 {
        self.real[i].powi(2) + self.imag[i].powi(2)
    }

    /// 按能量从大到小排列的列下标
    pub fn ranked(&self) -> Vec<usize> {
        let mut order = (0..self.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.energy(b).total_cmp(&self.energy(a)));
        order
    }
}

/// 实方阵的特征分解
pub trait EigenSolver {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Eigen>;
}

/// 基于 nalgebra `SymmetricEigen` 的实对称矩阵特征分解，虚部恒为 0
#[derive(Debug, Clone, Copy)]
pub struct SymmetricSolver {
    pub eps: f64,
    pub max_iter: usize,
}

impl Default for SymmetricSolver {
    fn default() -> Self {
        Self { eps: f64::EPSILON, max_iter: 10_000 }
    }
}

impl EigenSolver for SymmetricSolver {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Eigen> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }
        let SymmetricEigen { eigenvectors, eigenvalues } =
            SymmetricEigen::try_new(matrix.clone(), self.eps, self.max_iter)
                .ok_or(Error::NoConvergence { max_iter: self.max_iter })?;
        Ok(Eigen { imag: DVector::zeros(rows), real: eigenvalues, vectors: eigenvectors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_decompose() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let eigen = SymmetricSolver::default().decompose(&m).unwrap();
        assert_eq!(eigen.len(), 2);

        let order = eigen.ranked();
        assert!((eigen.real[order[0]] - 3.0).abs() < 1e-10);
        assert!((eigen.real[order[1]] - 1.0).abs() < 1e-10);
        assert!(eigen.imag.iter().all(|&x| x == 0.0));

        // M v = λ v
        for i in 0..2 {
            let v = eigen.vectors.column(i);
            let diff = &m * v - v * eigen.real[i];
            assert!(diff.norm() < 1e-10);
        }
    }

    #[test]
    fn test_ranked_by_modulus() {
        let eigen = Eigen {
            real: DVector::from_vec(vec![1.0, -5.0, 0.0, 3.0]),
            imag: DVector::from_vec(vec![0.0, 0.0, 4.0, 0.0]),
            vectors: DMatrix::identity(4, 4),
        };
        assert_eq!(eigen.ranked(), vec![1, 2, 3, 0]);
        assert_eq!(eigen.energy(2), 16.0);
    }

    #[test]
    fn test_not_square() {
        let m = DMatrix::<f64>::zeros(2, 3);
        let err = SymmetricSolver::default().decompose(&m).unwrap_err();
        assert!(matches!(err, Error::NotSquare { rows: 2, cols: 3 }));
    }
}
