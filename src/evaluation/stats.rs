//! Statistics kernel for hypothesis validation.
//!
//! Pure functions over `f64` slices: descriptive helpers, simple linear
//! regression against the observation index, one-way ANOVA and the
//! two-sample t-test. Distribution tails go through the regularized
//! incomplete beta function, so no table lookups or normal approximations
//! are involved.

// ── Descriptive helpers ─────────────────────────────────────────────

/// Division that yields 0.0 instead of NaN/inf for a zero denominator.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Clamps into [0, 1]. NaN maps to 0.0 (no evidence).
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Arithmetic mean. 0.0 for an empty slice; callers that need to tell
/// "empty" from "zero" check the length themselves.
pub fn mean(values: &[f64]) -> f64 {
    safe_div(values.iter().sum::<f64>(), values.len() as f64)
}

/// Unbiased sample variance (n - 1 denominator). 0.0 below two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Trailing rolling mean with a minimum of one period: element `i` is the
/// mean of `values[i + 1 - window..=i]`, truncated at the start of the slice.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let len = (i + 1).min(window);
        out.push(sum / len as f64);
    }
    out
}

// ── Simple Linear Regression ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares of `y` against the observation index `0..n`.
/// Returns `None` below two observations.
///
/// R² is `1 - SS_res / SS_tot`. For constant `y` it is 1.0 when the fit is
/// exact and 0.0 otherwise.
pub fn ordinary_least_squares(y: &[f64]) -> Option<LinearFit> {
    let n = y.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (yi - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, yi) in y.iter().enumerate() {
        let predicted = intercept + slope * i as f64;
        ss_res += (yi - predicted).powi(2);
        ss_tot += (yi - y_mean).powi(2);
    }
    let r_squared = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

// ── One-Way ANOVA ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
}

/// One-way analysis of variance across `groups`. Empty groups are ignored.
///
/// Returns `None` when fewer than two non-empty groups remain or there are
/// no within-group degrees of freedom (every group has a single value).
/// Zero within-group variance gives F = inf and p = 0 when the group means
/// differ, and F = 0, p = 1 when they do not.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaResult> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    if k < 2 {
        return None;
    }
    let total_n: usize = groups.iter().map(|g| g.len()).sum();
    if total_n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total_n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in &groups {
        let m = mean(g);
        ss_between += g.len() as f64 * (m - grand_mean).powi(2);
        ss_within += g.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (total_n - k) as f64;

    let (f_statistic, p_value) = if ss_within == 0.0 {
        if ss_between == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = (ss_between / df_between) / (ss_within / df_within);
        (f, f_distribution_sf(f, df_between, df_within))
    };

    Some(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// Survival function P(F > f) of the F distribution with (d1, d2) degrees of freedom.
pub fn f_distribution_sf(f: f64, d1: f64, d2: f64) -> f64 {
    if !(d1 > 0.0 && d2 > 0.0) || f.is_nan() {
        return 1.0;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    let x = d2 / (d2 + d1 * f);
    regularized_incomplete_beta(d2 / 2.0, d1 / 2.0, x)
}

// ── Two-Sample T-Test ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestResult {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

/// Independent two-sample t-test of `a` against `b` (t > 0 when mean(a) > mean(b)).
///
/// `equal_variance = true` runs the pooled Student test; `false` runs Welch's
/// test with Welch-Satterthwaite degrees of freedom. Returns `None` when the
/// samples are too small for the chosen variant. A zero standard error gives
/// t = 0, p = 1 for equal means and t = ±inf, p = 0 otherwise.
pub fn two_sample_t_test(a: &[f64], b: &[f64], equal_variance: bool) -> Option<TTestResult> {
    let (n_a, n_b) = (a.len(), b.len());
    if n_a == 0 || n_b == 0 || n_a + n_b < 3 {
        return None;
    }
    if !equal_variance && (n_a < 2 || n_b < 2) {
        return None;
    }

    let (mean_a, mean_b) = (mean(a), mean(b));
    let (var_a, var_b) = (sample_variance(a), sample_variance(b));
    let (n_a_f, n_b_f) = (n_a as f64, n_b as f64);
    let pooled_df = (n_a + n_b - 2) as f64;

    let (se, df) = if equal_variance {
        let pooled = ((n_a_f - 1.0) * var_a + (n_b_f - 1.0) * var_b) / pooled_df;
        ((pooled * (1.0 / n_a_f + 1.0 / n_b_f)).sqrt(), pooled_df)
    } else {
        let s1_n = var_a / n_a_f;
        let s2_n = var_b / n_b_f;
        let df_denom = s1_n.powi(2) / (n_a_f - 1.0) + s2_n.powi(2) / (n_b_f - 1.0);
        let df = if df_denom > 0.0 && df_denom.is_finite() {
            (s1_n + s2_n).powi(2) / df_denom
        } else {
            pooled_df
        };
        ((s1_n + s2_n).sqrt(), df)
    };

    let diff = mean_a - mean_b;
    if se == 0.0 {
        let (t, p) = if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        };
        return Some(TTestResult {
            t_statistic: t,
            p_value: p,
            degrees_of_freedom: df,
        });
    }

    let t = diff / se;
    Some(TTestResult {
        t_statistic: t,
        p_value: students_t_two_tailed_p(t, df).clamp(0.0, 1.0),
        degrees_of_freedom: df,
    })
}

// ── Distribution Tails ──────────────────────────────────────────────

/// Two-tailed p-value of Student's t distribution.
pub fn students_t_two_tailed_p(t: f64, df: f64) -> f64 {
    if !df.is_finite() || df <= 0.0 || t.is_nan() {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x)
}

/// Regularized incomplete beta I_x(a, b).
/// Numerical Recipes style continued-fraction implementation.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let bt = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        (bt * beta_continued_fraction(a, b, x) / a).clamp(0.0, 1.0)
    } else {
        (1.0 - bt * beta_continued_fraction(b, a, 1.0 - x) / b).clamp(0.0, 1.0)
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERS: usize = 300;
    const EPS: f64 = 1.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        let aa = m_f * (b - m_f) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m_f) * (qab + m_f) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Lanczos approximation of ln(Gamma(x)) for x > 0.
#[allow(clippy::excessive_precision)]
fn ln_gamma(x: f64) -> f64 {
    // g = 7, n = 9
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + 7.5;
    let acc = COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFICIENTS[0], |acc, (i, &coef)| acc + coef / (x + i as f64));

    0.5 * (2.0 * std::f64::consts::PI).ln() + (t.ln() * (x + 0.5)) - t + acc.ln()
}
