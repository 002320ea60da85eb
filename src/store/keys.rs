/// Key prefix covering every interval of one device.
///
/// The byte length goes first so that no device's range overlaps another's,
/// e.g. `a` vs `a:b`.
pub fn interval_prefix(device_id: &str) -> String {
    format!("{:08x}:{}:", device_id.len(), device_id)
}

/// Within a device, keys sort by the raw bytes of `start_timestamp`.
pub fn interval_key(device_id: &str, start_timestamp: &str) -> String {
    format!("{}{}", interval_prefix(device_id), start_timestamp)
}
