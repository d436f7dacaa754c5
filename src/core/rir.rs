use crate::core::address::{parse_input, IpBlock};
use crate::domain::model::Rir;

// 簡化過的 /8 與 IPv6 分配表，以空白分隔
const ARIN_BLOCKS: &str = "
3.0.0.0/8 4.0.0.0/8 6.0.0.0/8 7.0.0.0/8 8.0.0.0/8 9.0.0.0/8 11.0.0.0/8
12.0.0.0/8 13.0.0.0/8 15.0.0.0/8 16.0.0.0/8 17.0.0.0/8 18.0.0.0/8
19.0.0.0/8 20.0.0.0/8 21.0.0.0/8 22.0.0.0/8 23.0.0.0/8 24.0.0.0/8
26.0.0.0/8 28.0.0.0/8 29.0.0.0/8 30.0.0.0/8 32.0.0.0/8 33.0.0.0/8
34.0.0.0/8 35.0.0.0/8 38.0.0.0/8 40.0.0.0/8 44.0.0.0/8 47.0.0.0/8
48.0.0.0/8 50.0.0.0/8 52.0.0.0/8 54.0.0.0/8 55.0.0.0/8 56.0.0.0/8
63.0.0.0/8 64.0.0.0/8 65.0.0.0/8 66.0.0.0/8 67.0.0.0/8 68.0.0.0/8
69.0.0.0/8 70.0.0.0/8 71.0.0.0/8 72.0.0.0/8 73.0.0.0/8 74.0.0.0/8
75.0.0.0/8 76.0.0.0/8 96.0.0.0/8 97.0.0.0/8 98.0.0.0/8 99.0.0.0/8
100.0.0.0/8 104.0.0.0/8 107.0.0.0/8 108.0.0.0/8 173.0.0.0/8 174.0.0.0/8
184.0.0.0/8 192.0.0.0/8 198.0.0.0/8 199.0.0.0/8 204.0.0.0/8 205.0.0.0/8
206.0.0.0/8 207.0.0.0/8 208.0.0.0/8 209.0.0.0/8 216.0.0.0/8
2001:400::/23 2001:1800::/23 2600::/12 2610::/23 2620::/23
";

const RIPE_BLOCKS: &str = "
2.0.0.0/8 5.0.0.0/8 25.0.0.0/8 31.0.0.0/8 37.0.0.0/8 46.0.0.0/8
51.0.0.0/8 53.0.0.0/8 57.0.0.0/8 62.0.0.0/8 77.0.0.0/8 78.0.0.0/8
79.0.0.0/8 80.0.0.0/8 81.0.0.0/8 82.0.0.0/8 83.0.0.0/8 84.0.0.0/8
85.0.0.0/8 86.0.0.0/8 87.0.0.0/8 88.0.0.0/8 89.0.0.0/8 90.0.0.0/8
91.0.0.0/8 92.0.0.0/8 93.0.0.0/8 94.0.0.0/8 95.0.0.0/8 109.0.0.0/8
176.0.0.0/8 178.0.0.0/8 185.0.0.0/8 188.0.0.0/8 193.0.0.0/8 194.0.0.0/8
195.0.0.0/8 212.0.0.0/8 213.0.0.0/8 217.0.0.0/8 2001:600::/23
2001:1400::/23 2001:2000::/19 2a00::/12
";

const APNIC_BLOCKS: &str = "
1.0.0.0/8 14.0.0.0/8 27.0.0.0/8 36.0.0.0/8 39.0.0.0/8 42.0.0.0/8
43.0.0.0/8 49.0.0.0/8 58.0.0.0/8 59.0.0.0/8 60.0.0.0/8 61.0.0.0/8
101.0.0.0/8 103.0.0.0/8 106.0.0.0/8 110.0.0.0/8 111.0.0.0/8 112.0.0.0/8
113.0.0.0/8 114.0.0.0/8 115.0.0.0/8 116.0.0.0/8 117.0.0.0/8 118.0.0.0/8
119.0.0.0/8 120.0.0.0/8 121.0.0.0/8 122.0.0.0/8 123.0.0.0/8 124.0.0.0/8
125.0.0.0/8 126.0.0.0/8 133.0.0.0/8 150.0.0.0/8 153.0.0.0/8 163.0.0.0/8
171.0.0.0/8 175.0.0.0/8 180.0.0.0/8 182.0.0.0/8 183.0.0.0/8 202.0.0.0/8
203.0.0.0/8 210.0.0.0/8 211.0.0.0/8 218.0.0.0/8 219.0.0.0/8 220.0.0.0/8
221.0.0.0/8 222.0.0.0/8 223.0.0.0/8 2001:200::/23 2001:c00::/23
2400::/12
";

const LACNIC_BLOCKS: &str = "
177.0.0.0/8 179.0.0.0/8 181.0.0.0/8 186.0.0.0/8 187.0.0.0/8 189.0.0.0/8
190.0.0.0/8 191.0.0.0/8 200.0.0.0/8 201.0.0.0/8 2001:1200::/23 2800::/12
";

const AFRINIC_BLOCKS: &str = "
41.0.0.0/8 102.0.0.0/8 105.0.0.0/8 154.0.0.0/8 155.0.0.0/8 156.0.0.0/8
196.0.0.0/8 197.0.0.0/8 2001:4200::/23 2c00::/12
";

/// 依位址判斷負責的 RIR；依 ARIN、RIPE、APNIC、LACNIC、AFRINIC 順序比對
#[derive(Debug, Clone)]
pub struct RirTable {
    entries: Vec<(Rir, Vec<IpBlock>)>,
}

impl RirTable {
    pub fn new() -> Self {
        let entries = [
            (Rir::Arin, ARIN_BLOCKS),
            (Rir::Ripe, RIPE_BLOCKS),
            (Rir::Apnic, APNIC_BLOCKS),
            (Rir::Lacnic, LACNIC_BLOCKS),
            (Rir::Afrinic, AFRINIC_BLOCKS),
        ]
        .into_iter()
        .map(|(rir, blocks)| {
            let parsed: Vec<IpBlock> = blocks
                .split_whitespace()
                .filter_map(IpBlock::parse)
                .collect();
            (rir, parsed)
        })
        .collect();

        Self { entries }
    }

    /// 無法解析或不在表內的位址一律交給 ARIN
    pub fn detect(&self, input: &str) -> Rir {
        let Ok(parsed) = parse_input(input.trim()) else {
            return Rir::Arin;
        };

        self.entries
            .iter()
            .find(|(_, blocks)| blocks.iter().any(|block| block.contains(&parsed.address)))
            .map(|(rir, _)| *rir)
            .unwrap_or(Rir::Arin)
    }

    pub fn block_count(&self, rir: Rir) -> usize {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == rir)
            .map(|(_, blocks)| blocks.len())
            .unwrap_or(0)
    }
}

impl Default for RirTable {
    fn default() -> Self {
        Self::new()
    }
}
