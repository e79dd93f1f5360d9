//! Bloom-фильтр хранилища (негативные lookup'ы).
//!
//! Конструкция:
//! - Битовый массив m бит + k хешей, double hashing: bit_i = (h1 + i*h2) mod m,
//!   где (h1, h2) — половины 16-байтового BLAKE2b дайджеста ключа (hash.rs).
//! - m выбирается по подсказке ёмкости n и целевому FP-rate p:
//!   m = ceil(-n*ln p / ln2^2), округляется ВВЕРХ до целого числа байт.
//!   k = ceil(-ln p / ln 2) — зависит только от p, поэтому восстановим при
//!   повторном открытии (n в файле не хранится).
//! - Байтовый массив растёт лениво: add() досоздаёт нули до нужного байта.
//!   Так как m зафиксирован на границе байта, массив никогда не перерастает
//!   m/8, и адресное пространство бит не сдвигается под уже добавленными
//!   ключами (нет ложных отрицаний).
//!
//! Сериализация: в файл уходит массив байт, дополненный нулями до m/8;
//! обратная загрузка ставит m = 8*len (то же адресное пространство).

use crate::hash::bloom_pair;

#[derive(Debug, Clone)]
pub struct Bloom {
    m_bits: u64,
    k_hashes: u32,
    bits: Vec<u8>,
}

impl Bloom {
    /// Фильтр под ожидаемое число элементов и целевой FP-rate.
    /// Подсказка ёмкости клампится к >= 1 (деление на n в формуле).
    pub fn with_capacity(items_hint: u64, fp_rate: f64) -> Self {
        let n = items_hint.max(1) as f64;
        let p = clamp_rate(fp_rate);

        // m = -n*ln(p)/ln(2)^2, затем вверх до границы байта
        let m_raw = (-n * p.ln() / (std::f64::consts::LN_2 * std::f64::consts::LN_2)).ceil();
        let m_bytes = ((m_raw as u64).max(1) + 7) / 8;

        Self {
            m_bits: m_bytes * 8,
            k_hashes: k_for_rate(p),
            // Лениво: байты появляются по мере add()
            bits: Vec::new(),
        }
    }

    /// Восстановление из байтов bloom-области файла. m = 8*len.
    pub fn from_bytes(bytes: Vec<u8>, fp_rate: f64) -> Self {
        let m_bits = ((bytes.len() as u64) * 8).max(8);
        Self {
            m_bits,
            k_hashes: k_for_rate(clamp_rate(fp_rate)),
            bits: bytes,
        }
    }

    /// Добавить ключ: выставить все k бит. Байтовый массив досоздаётся
    /// нулями, если нужный бит лежит за текущей длиной.
    pub fn add(&mut self, key: &[u8]) {
        let (h1, h2) = bloom_pair(key);
        for i in 0..self.k_hashes {
            let bit = h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.m_bits;
            let byte = (bit / 8) as usize;
            if byte >= self.bits.len() {
                self.bits.resize(byte + 1, 0);
            }
            self.bits[byte] |= 1u8 << (bit % 8);
        }
    }

    /// Тест членства: true только если все k бит выставлены.
    /// Бит за пределами массива читается как 0.
    pub fn contains(&self, key: &[u8]) -> bool {
        let (h1, h2) = bloom_pair(key);
        (0..self.k_hashes).all(|i| {
            let bit = h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.m_bits;
            let byte = (bit / 8) as usize;
            match self.bits.get(byte) {
                Some(b) => (b >> (bit % 8)) & 1 == 1,
                None => false,
            }
        })
    }

    /// Полная длина bloom-области в байтах (m/8) — под резервирование в файле.
    #[inline]
    pub fn reserved_len(&self) -> usize {
        (self.m_bits / 8) as usize
    }

    /// Текущая (лениво выросшая) длина массива.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn k_hashes(&self) -> u32 {
        self.k_hashes
    }

    #[inline]
    pub fn m_bits(&self) -> u64 {
        self.m_bits
    }

    /// Слить наши биты в отображённую область файла (OR, чтобы параллельные
    /// писатели не затирали чужие биты) и принять результат как своё состояние.
    /// region — ровно bloom-область файла; длина не меньше byte_len().
    pub fn merge_into(&mut self, region: &mut [u8]) {
        for (dst, src) in region.iter_mut().zip(self.bits.iter()) {
            *dst |= *src;
        }
        self.bits = region.to_vec();
        let grown = (self.bits.len() as u64) * 8;
        if grown > self.m_bits {
            self.m_bits = grown;
        }
    }
}

/// k = ceil(-ln p / ln 2) — оптимум (m/n)*ln2 при нескруглённом m.
fn k_for_rate(p: f64) -> u32 {
    ((-p.ln() / std::f64::consts::LN_2).ceil() as u32).max(1)
}

fn clamp_rate(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(1e-9, 0.5)
    } else {
        0.5
    }
}
