use ndarray::{Array2, ArrayBase, Axis, Data, Dimension};

use crate::error::{FeatureError, Result};
use crate::types::MeanVar;

/// Mean and population variance over every element of `input`.
pub(crate) fn mean_var<S, D>(input: &ArrayBase<S, D>, what: &str) -> Result<MeanVar>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let mean = input
        .mean()
        .ok_or_else(|| FeatureError::computation(format!("{} produced no frames", what)))?;
    let var = input.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / input.len() as f64;
    Ok(MeanVar { mean, var })
}

/// One mean/variance pair per column of a `[frame, coefficient]` matrix.
pub(crate) fn column_mean_var(input: &Array2<f64>, what: &str) -> Result<Vec<MeanVar>> {
    if input.nrows() == 0 {
        return Err(FeatureError::computation(format!(
            "{} produced no frames",
            what
        )));
    }
    let means = input
        .mean_axis(Axis(0))
        .ok_or_else(|| FeatureError::computation(format!("{} produced no frames", what)))?;
    let vars = input.var_axis(Axis(0), 0.0);
    Ok(means
        .iter()
        .zip(vars.iter())
        .map(|(&mean, &var)| MeanVar { mean, var })
        .collect())
}

/// Reject matrices carrying NaN or infinities before they reach a row.
pub(crate) fn ensure_finite<S, D>(input: &ArrayBase<S, D>, what: &str) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if input.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(FeatureError::computation(format!(
            "{} produced non-finite values",
            what
        )))
    }
}
