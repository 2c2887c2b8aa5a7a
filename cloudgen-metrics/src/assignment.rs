//! Minimum-cost linear assignment (Hungarian method, shortest augmenting
//! paths with potentials). Runs in O(rows² · cols).

use crate::{MetricsError, Result};

/// Assign every row of a row-major `rows x cols` cost matrix to a distinct
/// column, minimizing the total cost. Requires `rows <= cols`.
///
/// Returns the chosen column for each row.
pub fn solve(cost: &[f64], rows: usize, cols: usize) -> Result<Vec<usize>> {
    if cost.len() != rows * cols || rows > cols {
        return Err(MetricsError::ShapeMismatch {
            expected: (rows, cols),
            actual: (cost.len(), 1),
        });
    }
    if cost.iter().any(|c| !c.is_finite()) {
        return Err(MetricsError::NonFiniteCost);
    }
    if rows == 0 {
        return Ok(Vec::new());
    }

    // 1-based: index 0 is the virtual source row/column
    let mut u = vec![0.0f64; rows + 1];
    let mut v = vec![0.0f64; cols + 1];
    let mut owner = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];

    for row in 1..=rows {
        owner[0] = row;
        let mut col0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];

        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0usize;

            for col in 1..=cols {
                if used[col] {
                    continue;
                }
                let reduced = cost[(row0 - 1) * cols + (col - 1)] - u[row0] - v[col];
                if reduced < min_slack[col] {
                    min_slack[col] = reduced;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=cols {
                if used[col] {
                    u[owner[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }

        // flip the augmenting path
        loop {
            let prev = way[col0];
            owner[col0] = owner[prev];
            col0 = prev;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; rows];
    for col in 1..=cols {
        if owner[col] != 0 {
            assignment[owner[col] - 1] = col - 1;
        }
    }
    Ok(assignment)
}
