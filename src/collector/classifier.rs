use super::types::MetricType;
use crate::snmp::oid::DSK_ENTRY;

/// Определяет колонку dskTable по OID вида `<dskEntry>.<колонка>.<индекс>`.
///
/// Смотрит только на арку сразу под корнем таблицы, поэтому одинаковые цифры
/// в префиксе или индексе на результат не влияют.
pub fn classify(oid: &str) -> MetricType {
    let Some(rest) = oid.trim().trim_start_matches('.').strip_prefix(DSK_ENTRY) else {
        return MetricType::Unknown;
    };
    let Some(rest) = rest.strip_prefix('.') else {
        return MetricType::Unknown;
    };

    match rest.split('.').next() {
        Some("2") => MetricType::Path,
        Some("6") => MetricType::TotalKb,
        Some("7") => MetricType::AvailableKb,
        Some("8") => MetricType::UsedKb,
        Some("9") => MetricType::PercentUsed,
        _ => MetricType::Unknown,
    }
}
