use crate::domain::model::{InputKind, IpInput};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// 解析單一 IP 位址或網段（非嚴格模式：主機位元會被清除）
pub fn parse_input(text: &str) -> Result<IpInput, String> {
    if text.contains('/') {
        let block = IpBlock::parse_lenient(text)
            .ok_or_else(|| format!("'{}' does not appear to be an IPv4 or IPv6 network", text))?;
        Ok(IpInput {
            kind: InputKind::Network,
            address: block.network,
            prefix_len: Some(block.prefix_len),
        })
    } else {
        let address = text
            .parse::<IpAddr>()
            .map_err(|_| format!("'{}' does not appear to be an IPv4 or IPv6 address", text))?;
        Ok(IpInput {
            kind: InputKind::Address,
            address,
            prefix_len: None,
        })
    }
}

/// 網段：網路位址加上前綴長度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpBlock {
    pub network: IpAddr,
    pub prefix_len: u8,
}

impl IpBlock {
    /// 嚴格解析 `addr/len`，用於內建的 RIR 對照表
    pub fn parse(cidr: &str) -> Option<Self> {
        let block = Self::parse_lenient(cidr)?;
        let (addr, _) = cidr.split_once('/')?;
        (addr.parse::<IpAddr>().ok()? == block.network).then_some(block)
    }

    /// 解析 `addr/len` 或 `addr/netmask`，並清除主機位元
    pub fn parse_lenient(text: &str) -> Option<Self> {
        let (addr, prefix) = text.split_once('/')?;
        let address: IpAddr = addr.parse().ok()?;
        let prefix_len = match address {
            IpAddr::V4(_) => parse_v4_prefix(prefix)?,
            IpAddr::V6(_) => parse_numeric_prefix(prefix, 128)?,
        };
        Some(Self {
            network: mask(address, prefix_len),
            prefix_len,
        })
    }

    pub fn contains(&self, address: &IpAddr) -> bool {
        match (self.network, address) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(*address, self.prefix_len) == self.network
            }
            _ => false,
        }
    }
}

fn parse_numeric_prefix(prefix: &str, max: u8) -> Option<u8> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let len: u8 = prefix.parse().ok()?;
    (len <= max).then_some(len)
}

fn parse_v4_prefix(prefix: &str) -> Option<u8> {
    if let Some(len) = parse_numeric_prefix(prefix, 32) {
        return Some(len);
    }
    // 點分十進位遮罩：網路遮罩 255.255.0.0，或反向的主機遮罩 0.0.255.255
    let bits = u32::from(prefix.parse::<Ipv4Addr>().ok()?);
    prefix_from_netmask(bits).or_else(|| prefix_from_netmask(!bits))
}

fn prefix_from_netmask(bits: u32) -> Option<u8> {
    let len = bits.leading_ones();
    (bits.checked_shl(len).unwrap_or(0) == 0).then_some(len as u8)
}

fn mask(address: IpAddr, prefix_len: u8) -> IpAddr {
    match address {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let masked = match prefix_len {
                0 => 0,
                len => bits & (u32::MAX << (32 - u32::from(len))),
            };
            IpAddr::V4(Ipv4Addr::from(masked))
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let masked = match prefix_len {
                0 => 0,
                len => bits & (u128::MAX << (128 - u32::from(len))),
            };
            IpAddr::V6(Ipv6Addr::from(masked))
        }
    }
}
