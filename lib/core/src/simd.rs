// SIMD kernels for descriptor comparison
// AVX2/FMA on x86_64, NEON on aarch64, two-accumulator scalar fallback elsewhere.
// Callers are responsible for length checks; the kernels only ever read the
// common prefix of both slices.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Below this length the dispatch overhead outweighs the vector path
#[cfg(target_arch = "x86_64")]
const MIN_DIM_SIZE_AVX: usize = 32;

#[cfg(target_arch = "aarch64")]
const MIN_DIM_SIZE_NEON: usize = 16;

#[inline]
fn common_prefix<'a>(a: &'a [f32], b: &'a [f32]) -> (&'a [f32], &'a [f32]) {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    (&a[..n], &b[..n])
}

/// Dot product
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    let (a, b) = common_prefix(a, b);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
            && a.len() >= MIN_DIM_SIZE_AVX
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && a.len() >= MIN_DIM_SIZE_NEON {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// Sum of squared differences, Σ(aᵢ−bᵢ)²
#[inline]
pub fn squared_distance_simd(a: &[f32], b: &[f32]) -> f32 {
    let (a, b) = common_prefix(a, b);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
            && a.len() >= MIN_DIM_SIZE_AVX
        {
            return unsafe { squared_distance_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && a.len() >= MIN_DIM_SIZE_NEON {
            return unsafe { squared_distance_neon(a, b) };
        }
    }

    squared_distance_scalar(a, b)
}

/// Sum of elementwise minima, Σ min(aᵢ, bᵢ). This is the histogram intersection.
#[inline]
pub fn min_sum_simd(a: &[f32], b: &[f32]) -> f32 {
    let (a, b) = common_prefix(a, b);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && a.len() >= MIN_DIM_SIZE_AVX {
            return unsafe { min_sum_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && a.len() >= MIN_DIM_SIZE_NEON {
            return unsafe { min_sum_neon(a, b) };
        }
    }

    min_sum_scalar(a, b)
}

/// Squared Euclidean length
#[inline]
pub fn norm_squared_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v)
}

/// Euclidean length
#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    norm_squared_simd(v).sqrt()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_avx2(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let mut sum = _mm_add_ps(high, low);
    sum = _mm_hadd_ps(sum, sum);
    sum = _mm_hadd_ps(sum, sum);
    _mm_cvtss_f32(sum)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = _mm256_setzero_ps();
    let mut sum2 = _mm256_setzero_ps();

    while i + 15 < dim {
        let va1 = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb1 = _mm256_loadu_ps(b.as_ptr().add(i));
        let va2 = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let vb2 = _mm256_loadu_ps(b.as_ptr().add(i + 8));
        sum1 = _mm256_fmadd_ps(va1, vb1, sum1);
        sum2 = _mm256_fmadd_ps(va2, vb2, sum2);
        i += 16;
    }

    let mut dot = hsum_avx2(_mm256_add_ps(sum1, sum2));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn squared_distance_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = _mm256_setzero_ps();
    let mut sum2 = _mm256_setzero_ps();

    while i + 15 < dim {
        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        let d2 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i + 8)),
            _mm256_loadu_ps(b.as_ptr().add(i + 8)),
        );
        sum1 = _mm256_fmadd_ps(d1, d1, sum1);
        sum2 = _mm256_fmadd_ps(d2, d2, sum2);
        i += 16;
    }

    let mut ssd = hsum_avx2(_mm256_add_ps(sum1, sum2));
    while i < dim {
        let diff = a[i] - b[i];
        ssd += diff * diff;
        i += 1;
    }
    ssd
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn min_sum_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = _mm256_setzero_ps();
    let mut sum2 = _mm256_setzero_ps();

    while i + 15 < dim {
        let m1 = _mm256_min_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        let m2 = _mm256_min_ps(
            _mm256_loadu_ps(a.as_ptr().add(i + 8)),
            _mm256_loadu_ps(b.as_ptr().add(i + 8)),
        );
        sum1 = _mm256_add_ps(sum1, m1);
        sum2 = _mm256_add_ps(sum2, m2);
        i += 16;
    }

    let mut total = hsum_avx2(_mm256_add_ps(sum1, sum2));
    while i < dim {
        total += a[i].min(b[i]);
        i += 1;
    }
    total
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = vdupq_n_f32(0.0);
    let mut sum2 = vdupq_n_f32(0.0);

    while i + 7 < dim {
        sum1 = vfmaq_f32(sum1, vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        sum2 = vfmaq_f32(
            sum2,
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        i += 8;
    }

    let mut dot = vaddvq_f32(vaddq_f32(sum1, sum2));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn squared_distance_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = vdupq_n_f32(0.0);
    let mut sum2 = vdupq_n_f32(0.0);

    while i + 7 < dim {
        let d1 = vsubq_f32(vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        let d2 = vsubq_f32(
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        sum1 = vfmaq_f32(sum1, d1, d1);
        sum2 = vfmaq_f32(sum2, d2, d2);
        i += 8;
    }

    let mut ssd = vaddvq_f32(vaddq_f32(sum1, sum2));
    while i < dim {
        let diff = a[i] - b[i];
        ssd += diff * diff;
        i += 1;
    }
    ssd
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn min_sum_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = vdupq_n_f32(0.0);
    let mut sum2 = vdupq_n_f32(0.0);

    while i + 7 < dim {
        let m1 = vminq_f32(vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        let m2 = vminq_f32(
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        sum1 = vaddq_f32(sum1, m1);
        sum2 = vaddq_f32(sum2, m2);
        i += 8;
    }

    let mut total = vaddvq_f32(vaddq_f32(sum1, sum2));
    while i < dim {
        total += a[i].min(b[i]);
        i += 1;
    }
    total
}

#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(4)) {
        dot0 += a_chunk[0] * b_chunk[0] + a_chunk[1] * b_chunk[1];
        dot1 += a_chunk[2] * b_chunk[2] + a_chunk[3] * b_chunk[3];
    }

    for i in (a.len() - remainder.len())..a.len() {
        dot0 += a[i] * b[i];
    }

    dot0 + dot1
}

#[inline]
fn squared_distance_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(4)) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];
        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }

    sum0 + sum1
}

#[inline]
fn min_sum_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(4)) {
        sum0 += a_chunk[0].min(b_chunk[0]) + a_chunk[1].min(b_chunk[1]);
        sum1 += a_chunk[2].min(b_chunk[2]) + a_chunk[3].min(b_chunk[3]);
    }

    for i in (a.len() - remainder.len())..a.len() {
        sum0 += a[i].min(b[i]);
    }

    sum0 + sum1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, scale: f32) -> Vec<f32> {
        (0..n).map(|i| (i as f32) * scale).collect()
    }

    #[test]
    fn test_kernels_match_scalar_on_long_inputs() {
        // Long enough to take the vector path where available, odd length for the tail
        let a = ramp(147, 0.5);
        let b: Vec<f32> = ramp(147, 0.25).into_iter().rev().collect();

        let dot = dot_product_simd(&a, &b);
        assert!((dot - dot_product_scalar(&a, &b)).abs() / dot.abs().max(1.0) < 1e-4);

        let ssd = squared_distance_simd(&a, &b);
        assert!((ssd - squared_distance_scalar(&a, &b)).abs() / ssd.max(1.0) < 1e-4);

        let mins = min_sum_simd(&a, &b);
        assert!((mins - min_sum_scalar(&a, &b)).abs() / mins.max(1.0) < 1e-4);
    }

    #[test]
    fn test_squared_distance_short() {
        assert_eq!(squared_distance_simd(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_min_sum_short() {
        assert!((min_sum_simd(&[0.5, 0.5], &[0.25, 0.75]) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_norm() {
        assert!((norm_simd(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }
}
