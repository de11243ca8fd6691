//! Reed-Solomon over GF(256) with primitive polynomial 0x11D.
//!
//! Table-free: field arithmetic is computed on the fly, which is fast
//! enough for the single 26-codeword block a version 1 symbol carries.
//! Encoding produces the EC bytes of a systematic code with generator
//! roots at alpha^0..alpha^{t-1}; correction runs syndromes,
//! Berlekamp-Massey, Chien search and Forney.
//!
//! Codewords are transmitted highest degree first, so `codewords[i]` is
//! the coefficient of x^{n-1-i}. Locator and evaluator polynomials below
//! are kept lowest degree first.

const PRIM: u16 = 0x11D;
const GEN: u8 = 2;

#[inline]
fn gf_add(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
fn gf_mul(a: u8, b: u8) -> u8 {
    let mut aa = a as u16;
    let mut bb = b as u16;
    let mut acc: u8 = 0;
    while bb != 0 {
        if bb & 1 != 0 {
            acc ^= aa as u8;
        }
        let carry = aa & 0x80 != 0;
        aa = (aa << 1) & 0xFF;
        if carry {
            aa ^= PRIM;
        }
        bb >>= 1;
    }
    acc
}

#[inline]
fn gf_pow(a: u8, mut e: i32) -> u8 {
    if e == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    e %= 255;
    if e < 0 {
        e += 255;
    }
    let mut base = a;
    let mut acc: u8 = 1;
    let mut exp = e as u32;
    while exp > 0 {
        if exp & 1 != 0 {
            acc = gf_mul(acc, base);
        }
        base = gf_mul(base, base);
        exp >>= 1;
    }
    acc
}

#[inline]
fn gf_inv(a: u8) -> u8 {
    debug_assert!(a != 0);
    gf_pow(a, 254)
}

/// Generator polynomial coefficients g_0..g_{t-1}, lowest degree first.
/// The leading coefficient of x^t is always 1 and is left implicit.
fn generator_poly(ec_len: usize) -> Vec<u8> {
    let mut g = vec![1u8];
    for i in 0..ec_len {
        let a = gf_pow(GEN, i as i32);
        let mut next = vec![0u8; g.len() + 1];
        for (j, &gj) in g.iter().enumerate() {
            next[j] = gf_add(next[j], gf_mul(gj, a));
            next[j + 1] = gf_add(next[j + 1], gj);
        }
        g = next;
    }
    g.truncate(ec_len);
    g
}

/// Compute `ec_len` error correction bytes for `data`, highest degree
/// first, ready to append to the data codewords.
pub fn ec_bytes(data: &[u8], ec_len: usize) -> Vec<u8> {
    if ec_len == 0 {
        return Vec::new();
    }
    let generator = generator_poly(ec_len);
    // rem[0] holds the x^{t-1} coefficient, matching transmit order.
    let mut rem = vec![0u8; ec_len];
    for &d in data {
        let coef = gf_add(d, rem[0]);
        for i in 0..ec_len - 1 {
            rem[i] = rem[i + 1];
        }
        rem[ec_len - 1] = 0;
        if coef != 0 {
            for i in 0..ec_len {
                rem[i] = gf_add(rem[i], gf_mul(coef, generator[ec_len - 1 - i]));
            }
        }
    }
    rem
}

/// Correct errors in place in one `data_len + ec_len` block.
///
/// Returns the number of corrected bytes, or `None` if the block is
/// uncorrectable.
pub fn correct_block(codewords: &mut [u8], data_len: usize, ec_len: usize) -> Option<usize> {
    let n = data_len + ec_len;
    if codewords.len() != n || ec_len == 0 {
        return None;
    }

    let synd = syndromes(codewords, ec_len);
    if synd.iter().all(|&s| s == 0) {
        return Some(0);
    }

    let sigma = berlekamp_massey(&synd);
    let errors = sigma.len() - 1;
    if errors == 0 || errors > ec_len / 2 {
        return None;
    }

    // omega(x) = S(x) * sigma(x) mod x^t
    let omega = poly_mul_mod(&synd, &sigma, ec_len);

    // Chien search over all codeword degrees.
    let mut corrected = 0usize;
    let mut roots = 0usize;
    for j in 0..n {
        let x_inv = gf_pow(GEN, -(j as i32));
        if poly_eval(&sigma, x_inv) != 0 {
            continue;
        }
        roots += 1;

        // Forney with b = 0: e = X * omega(1/X) / sigma'(1/X).
        let x = gf_pow(GEN, j as i32);
        let num = gf_mul(x, poly_eval(&omega, x_inv));
        let den = poly_eval(&poly_derivative(&sigma), x_inv);
        if den == 0 {
            return None;
        }
        let magnitude = gf_mul(num, gf_inv(den));

        let idx = n - 1 - j;
        codewords[idx] = gf_add(codewords[idx], magnitude);
        if magnitude != 0 {
            corrected += 1;
        }
    }
    if roots != errors {
        return None;
    }

    let post = syndromes(codewords, ec_len);
    if post.iter().any(|&s| s != 0) {
        return None;
    }

    Some(corrected)
}

/// S_k = C(alpha^k) for k = 0..t-1.
fn syndromes(codewords: &[u8], ec_len: usize) -> Vec<u8> {
    let n = codewords.len();
    let mut synd = vec![0u8; ec_len];
    for (k, s) in synd.iter_mut().enumerate() {
        let a_k = gf_pow(GEN, k as i32);
        let mut acc = 0u8;
        for (i, &cw) in codewords.iter().enumerate() {
            acc = gf_add(acc, gf_mul(cw, gf_pow(a_k, (n - 1 - i) as i32)));
        }
        *s = acc;
    }
    synd
}

fn poly_eval(p: &[u8], x: u8) -> u8 {
    let mut y = 0u8;
    for &coef in p.iter().rev() {
        y = gf_add(gf_mul(y, x), coef);
    }
    y
}

/// Formal derivative in characteristic 2: only odd powers survive.
fn poly_derivative(p: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; p.len().saturating_sub(1).max(1)];
    for (i, &coef) in p.iter().enumerate().skip(1) {
        if i % 2 == 1 {
            out[i - 1] = coef;
        }
    }
    out
}

/// (a * b) mod x^cap, lowest degree first.
fn poly_mul_mod(a: &[u8], b: &[u8], cap: usize) -> Vec<u8> {
    let mut out = vec![0u8; cap];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 || i >= cap {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            if i + j >= cap {
                break;
            }
            out[i + j] = gf_add(out[i + j], gf_mul(ai, bj));
        }
    }
    out
}

/// Error locator polynomial from the syndromes, lowest degree first with
/// sigma[0] = 1.
fn berlekamp_massey(synd: &[u8]) -> Vec<u8> {
    let mut sigma = vec![1u8];
    let mut prev = vec![1u8];
    let mut l = 0usize;
    let mut m = 1usize;
    let mut prev_delta = 1u8;

    for n in 0..synd.len() {
        let mut delta = synd[n];
        for i in 1..sigma.len().min(l + 1) {
            if n >= i {
                delta = gf_add(delta, gf_mul(sigma[i], synd[n - i]));
            }
        }

        if delta == 0 {
            m += 1;
            continue;
        }

        // sigma -= (delta / prev_delta) * x^m * prev
        let coef = gf_mul(delta, gf_inv(prev_delta));
        let mut update = vec![0u8; m + prev.len()];
        for (i, &pi) in prev.iter().enumerate() {
            update[m + i] = gf_mul(pi, coef);
        }
        let snapshot = sigma.clone();
        if update.len() > sigma.len() {
            sigma.resize(update.len(), 0);
        }
        for (i, &u) in update.iter().enumerate() {
            sigma[i] = gf_add(sigma[i], u);
        }

        if 2 * l <= n {
            l = n + 1 - l;
            prev = snapshot;
            prev_delta = delta;
            m = 1;
        } else {
            m += 1;
        }
    }

    while sigma.len() > 1 && *sigma.last().unwrap_or(&1) == 0 {
        sigma.pop();
    }
    sigma
}
