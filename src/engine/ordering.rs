// ==========================================
// 考场座位分配系统 - 考生排序/分组
// ==========================================
// 两种分配模式只在此处不同，落位规则共用 SeatAllocator::place_one
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::types::AllocationMode;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ==========================================
// CandidateOrdering - 考生处理顺序
// ==========================================
pub struct CandidateOrdering {
    // 无状态，随机源由调用方注入
}

impl CandidateOrdering {
    pub fn new() -> Self {
        Self {}
    }

    /// 按模式生成处理顺序
    pub fn order<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [Candidate],
        mode: AllocationMode,
        rng: &mut R,
    ) -> Vec<&'a Candidate> {
        match mode {
            AllocationMode::Priority => self.priority_order(candidates),
            AllocationMode::Random => self.random_order(candidates, rng),
        }
    }

    /// PRIORITY: 全局稳定排序
    ///
    /// 排序键（升序，按原值逐字节比较，区分大小写）:
    /// 1) 考试中心标签
    /// 2) region
    /// 3) province
    /// 4) language
    /// 5) last_name
    /// 6) first_name
    pub fn priority_order<'a>(&self, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        let mut ordered: Vec<&Candidate> = candidates.iter().collect();
        ordered.sort_by(|a, b| self.compare(a, b));
        ordered
    }

    /// RANDOM: 分组后组内随机
    ///
    /// 1) 按考试中心标签首次出现顺序分组
    /// 2) 中心内按 (region, province, language) 升序分子组
    /// 3) 每个子组独立均匀打乱后依次拼接
    pub fn random_order<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [Candidate],
        rng: &mut R,
    ) -> Vec<&'a Candidate> {
        let mut label_order: Vec<&str> = Vec::new();
        let mut by_label: BTreeMap<&str, BTreeMap<(&str, &str, &str), Vec<&Candidate>>> =
            BTreeMap::new();

        for candidate in candidates {
            let label = label_of(candidate);
            let groups = by_label.entry(label).or_insert_with(|| {
                label_order.push(label);
                BTreeMap::new()
            });
            groups
                .entry((
                    candidate.region.as_str(),
                    candidate.province.as_str(),
                    candidate.language.as_str(),
                ))
                .or_default()
                .push(candidate);
        }

        let mut ordered = Vec::with_capacity(candidates.len());
        for label in label_order {
            if let Some(groups) = by_label.remove(label) {
                for (_, mut group) in groups {
                    group.shuffle(rng);
                    ordered.extend(group);
                }
            }
        }
        ordered
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        label_of(a)
            .cmp(label_of(b))
            .then_with(|| a.region.cmp(&b.region))
            .then_with(|| a.province.cmp(&b.province))
            .then_with(|| a.language.cmp(&b.language))
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    }
}

impl Default for CandidateOrdering {
    fn default() -> Self {
        Self::new()
    }
}

fn label_of(candidate: &Candidate) -> &str {
    candidate.exam_center.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cand(code: &str, center: &str, region: &str, last: &str) -> Candidate {
        Candidate::new(code, last, "X", region, "P", "FR", Some(center))
    }

    fn codes(list: &[&Candidate]) -> Vec<String> {
        list.iter().map(|c| c.code.clone()).collect()
    }

    #[test]
    fn test_priority_order_sort_keys() {
        let roster = vec![
            cand("1", "B", "R1", "Zed"),
            cand("2", "A", "R2", "Alpha"),
            cand("3", "A", "R1", "Zed"),
            cand("4", "A", "R1", "Beta"),
        ];
        let ordering = CandidateOrdering::new();
        assert_eq!(codes(&ordering.priority_order(&roster)), vec!["4", "3", "2", "1"]);
    }

    #[test]
    fn test_priority_order_is_case_sensitive() {
        // 'B' (0x42) < 'a' (0x61)
        let roster = vec![cand("1", "a", "R", "N"), cand("2", "B", "R", "N")];
        let ordering = CandidateOrdering::new();
        assert_eq!(codes(&ordering.priority_order(&roster)), vec!["2", "1"]);
    }

    #[test]
    fn test_random_order_keeps_groups_contiguous() {
        let roster = vec![
            cand("b1", "B", "R1", "N"),
            cand("a1", "A", "R2", "N"),
            cand("a2", "A", "R1", "N"),
            cand("b2", "B", "R1", "N"),
            cand("a3", "A", "R1", "N"),
        ];
        let ordering = CandidateOrdering::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ordered = ordering.random_order(&roster, &mut rng);

        let seq = codes(&ordered);
        // 中心按首次出现顺序: B 在前
        assert!(seq[..2].iter().all(|c| c.starts_with('b')));
        // A 中心内 (R1) 子组先于 (R2)
        let mut a_r1: Vec<String> = seq[2..4].to_vec();
        a_r1.sort();
        assert_eq!(a_r1, vec!["a2", "a3"]);
        assert_eq!(seq[4], "a1");
    }

    #[test]
    fn test_random_order_reproducible_with_seed() {
        let roster: Vec<Candidate> = (0..30)
            .map(|i| cand(&format!("C{:02}", i), "A", "R", "N"))
            .collect();
        let ordering = CandidateOrdering::new();

        let first = codes(&ordering.random_order(&roster, &mut ChaCha8Rng::seed_from_u64(42)));
        let second = codes(&ordering.random_order(&roster, &mut ChaCha8Rng::seed_from_u64(42)));
        assert_eq!(first, second);
        assert_eq!(first.len(), 30);
    }
}
