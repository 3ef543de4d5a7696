use crate::normalize::{InterfaceRecord, PortStatus};
use crate::ranking::{
    max_usage, rank_usage, usage_percentage, usage_total, LowestUsage, UsageParseError,
};

fn record(port: &str, status: PortStatus, input: &str, output: &str) -> InterfaceRecord {
    InterfaceRecord {
        port: port.to_string(),
        status,
        description: None,
        vlan: Some("10".to_string()),
        last_input: "never".to_string(),
        input_packets: input.to_string(),
        output_packets: output.to_string(),
    }
}

#[test]
fn totals_require_both_counts_to_parse() {
    assert_eq!(usage_total("150", "150"), Ok(300));
    assert_eq!(usage_total(" 7 ", "0"), Ok(7));
    assert_eq!(
        usage_total("N/A", "10"),
        Err(UsageParseError::InputPackets("N/A".to_string()))
    );
    assert_eq!(
        usage_total("10", ""),
        Err(UsageParseError::OutputPackets(String::new()))
    );
    assert!(usage_total("-5", "10").is_err());
    assert_eq!(
        usage_total(&u64::MAX.to_string(), "1"),
        Err(UsageParseError::Overflow)
    );
}

#[test]
fn max_ignores_non_numeric_interfaces() {
    // Arrange
    let records = vec![
        record("Gi0/0", PortStatus::NotConnect, "N/A", "999999999"),
        record("Gi1/0/1", PortStatus::Connected, "400", "600"),
        record("Gi1/0/2", PortStatus::NotConnect, "10", "20"),
    ];

    // Act / Assert
    assert_eq!(max_usage(&records), Some(1000));
    assert_eq!(rank_usage(&records).max_usage, Some(1000));
}

#[test]
fn percentage_is_rounded_to_two_places() {
    assert_eq!(usage_percentage(1000, 1000), Some(100.0));
    assert_eq!(usage_percentage(0, 1000), Some(0.0));
    assert_eq!(usage_percentage(1, 3), Some(33.33));
    assert_eq!(usage_percentage(2, 3), Some(66.67));
    assert_eq!(usage_percentage(0, 0), None);
}

#[test]
fn exact_half_rounds_to_even() {
    assert_eq!(usage_percentage(1, 32), Some(3.12));
    assert_eq!(usage_percentage(3125, 100_000), Some(3.12));
    assert_eq!(usage_percentage(3130, 100_000), Some(3.13));
    assert_eq!(usage_percentage(3, 32), Some(9.38));
}

#[test]
fn half_even_rounding_decides_between_close_ports() {
    // Arrange
    let records = vec![
        record("Gi1/0/1", PortStatus::Connected, "60000", "40000"),
        record("Gi1/0/2", PortStatus::NotConnect, "1565", "1565"),
        record("Gi1/0/3", PortStatus::NotConnect, "1500", "1625"),
    ];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    assert_eq!(ranking.percentage_for("Gi1/0/2"), Some(3.13));
    assert_eq!(
        ranking.lowest,
        Some(LowestUsage {
            interface: "Gi1/0/3".to_string(),
            usage_percentage: 3.12,
        })
    );
}

#[test]
fn lowest_disconnected_interface_wins() {
    // Arrange
    let records = vec![
        record("Gi1/0/1", PortStatus::Connected, "0", "0"),
        record("Gi1/0/2", PortStatus::NotConnect, "300", "200"),
        record("Gi1/0/3", PortStatus::NotConnect, "50", "50"),
        record("Gi1/0/4", PortStatus::Connected, "500", "500"),
    ];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    assert_eq!(
        ranking.lowest,
        Some(LowestUsage {
            interface: "Gi1/0/3".to_string(),
            usage_percentage: 10.0,
        })
    );
    assert_eq!(ranking.percentage_for("Gi1/0/2"), Some(50.0));
    assert_eq!(ranking.percentage_for("Gi1/0/1"), None, "connected ports get no percentage");
}

#[test]
fn exact_tie_keeps_first_seen_port() {
    // Arrange
    let records = vec![
        record("Gi1/0/7", PortStatus::NotConnect, "0", "0"),
        record("Gi1/0/8", PortStatus::Connected, "10", "10"),
        record("Gi1/0/2", PortStatus::NotConnect, "0", "0"),
    ];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    let lowest = ranking.lowest.expect("lowest");
    assert_eq!(lowest.interface, "Gi1/0/7");
    assert_eq!(lowest.usage_percentage, 0.0);
}

#[test]
fn unparsable_disconnected_port_is_listed_without_percentage() {
    // Arrange
    let records = vec![
        record("Gi0/0", PortStatus::NotConnect, "N/A", "N/A"),
        record("Gi1/0/1", PortStatus::NotConnect, "5", "5"),
        record("Gi1/0/2", PortStatus::Connected, "10", "10"),
    ];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    assert_eq!(ranking.disconnected.len(), 2);
    assert_eq!(ranking.disconnected[0].port, "Gi0/0");
    assert!(ranking.disconnected[0].total.is_err());
    assert_eq!(ranking.disconnected[0].percentage, None);
    assert_eq!(ranking.unparsable, vec!["Gi0/0".to_string()]);
    assert_eq!(
        ranking.lowest.map(|l| l.interface).as_deref(),
        Some("Gi1/0/1")
    );
}

#[test]
fn no_disconnected_ports_means_no_recommendation() {
    // Arrange
    let records = vec![record("Gi1/0/1", PortStatus::Connected, "10", "10")];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    assert!(ranking.disconnected.is_empty());
    assert_eq!(ranking.lowest, None);
}

#[test]
fn all_zero_traffic_leaves_percentages_undefined() {
    // Arrange
    let records = vec![
        record("Gi1/0/1", PortStatus::NotConnect, "0", "0"),
        record("Gi1/0/2", PortStatus::NotConnect, "0", "0"),
    ];

    // Act
    let ranking = rank_usage(&records);

    // Assert
    assert_eq!(ranking.max_usage, Some(0));
    assert!(ranking.disconnected.iter().all(|u| u.percentage.is_none()));
    assert_eq!(ranking.lowest, None);
}

#[test]
fn nothing_parsable_leaves_max_undefined() {
    let records = vec![record("Gi0/0", PortStatus::NotConnect, "", "")];
    let ranking = rank_usage(&records);
    assert_eq!(ranking.max_usage, None);
    assert_eq!(ranking.lowest, None);
}
