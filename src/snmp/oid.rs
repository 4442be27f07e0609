use snmp2::Oid;

use super::SnmpError;

/// sysDescr.0
pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
/// UCD-SNMP laLoad.1
pub const LA_LOAD_1: &str = "1.3.6.1.4.1.2021.10.1.3.1";
/// UCD-SNMP memAvailReal.0
pub const MEM_AVAIL_REAL: &str = "1.3.6.1.4.1.2021.4.6.0";
/// UCD-SNMP dskEntry, корень таблицы дисков
pub const DSK_ENTRY: &str = "1.3.6.1.4.1.2021.9.1";

/// Разбирает OID в точечной нотации в список арок
pub fn parse_arcs(s: &str) -> Result<Vec<u64>, SnmpError> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.map_err(|e| SnmpError::InvalidOid {
        oid: s.to_string(),
        reason: e.to_string(),
    })?;

    if parts.is_empty() {
        return Err(SnmpError::InvalidOid {
            oid: s.to_string(),
            reason: "пустой OID".to_string(),
        });
    }

    Ok(parts)
}

pub fn parse_oid(s: &str) -> Result<Oid<'static>, SnmpError> {
    let parts = parse_arcs(s)?;
    Oid::from(&parts).map_err(|e| SnmpError::InvalidOid {
        oid: s.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Лежит ли `oid` строго внутри поддерева `root`
pub fn is_descendant(oid: &[u64], root: &[u64]) -> bool {
    oid.len() > root.len() && oid.starts_with(root)
}
