//! Angles between principal axes and reference directions
use super::{EigenDecomposition, QuadFormError};
use crate::misc::clamp_unit;
use nalgebra::DVector;

fn unit(v: &DVector<f64>) -> Result<DVector<f64>, QuadFormError> {
    let norm = v.norm();
    if norm > 0.0 && norm.is_finite() {
        Ok(v / norm)
    } else {
        Err(QuadFormError::ZeroVector)
    }
}

/// Angle, in degrees, between a principal axis and a reference axis.
///
/// Computes `acos(v̂ · r̂)` where both vectors are first scaled to unit
/// length. Round-off can push the dot product of unit vectors just outside
/// [-1, 1]; it is clamped back so the result is never NaN.
///
/// An eigenvector is only defined up to sign. Flipping `eigenvector` maps
/// the angle θ to 180° - θ, so the same axis reads as either θ or its
/// reflection.
///
/// # Errors
///
/// - `DimensionMismatch` if the vectors differ in length
/// - `ZeroVector` if either vector has zero or non-finite length
///
/// # Example
///
/// ```
/// use ellipstat::quad_form::principal_axis_angle;
/// use nalgebra::DVector;
///
/// let x_axis = DVector::from_column_slice(&[1.0, 0.0]);
/// let v = DVector::from_column_slice(&[1.0, 1.0]);
///
/// let theta = principal_axis_angle(&v, &x_axis).unwrap();
/// assert!((theta - 45.0).abs() < 1E-12);
///
/// let flipped = principal_axis_angle(&(-v), &x_axis).unwrap();
/// assert!((flipped - 135.0).abs() < 1E-12);
/// ```
pub fn principal_axis_angle(
    eigenvector: &DVector<f64>,
    reference_axis: &DVector<f64>,
) -> Result<f64, QuadFormError> {
    if eigenvector.len() != reference_axis.len() {
        return Err(QuadFormError::DimensionMismatch {
            left: eigenvector.len(),
            right: reference_axis.len(),
        });
    }

    let v = unit(eigenvector)?;
    let r = unit(reference_axis)?;
    Ok(clamp_unit(v.dot(&r)).acos().to_degrees())
}

impl EigenDecomposition {
    /// The angle of every principal axis to `reference_axis`, in degrees,
    /// in eigenpair order.
    ///
    /// # Example
    ///
    /// ```
    /// use ellipstat::quad_form::eigen_decompose;
    /// use nalgebra::{DMatrix, DVector};
    ///
    /// let a = DMatrix::from_row_slice(2, 2, &[5.0, 3.0, 3.0, 5.0]);
    /// let x_axis = DVector::from_column_slice(&[1.0, 0.0]);
    ///
    /// let angles = eigen_decompose(&a).unwrap().axis_angles(&x_axis).unwrap();
    /// assert!((angles[0] - 45.0).abs() < 1E-9);
    /// assert!((angles[1] - 135.0).abs() < 1E-9);
    /// ```
    pub fn axis_angles(
        &self,
        reference_axis: &DVector<f64>,
    ) -> Result<Vec<f64>, QuadFormError> {
        self.eigenpairs()
            .map(|(_, v)| principal_axis_angle(&v, reference_axis))
            .collect()
    }
}
