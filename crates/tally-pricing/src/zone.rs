//! # Zone Strategies
//!
//! The active tax zone is resolved once per pipeline run and held constant
//! across every pass.

use tally_core::{Channel, Order, Zone};
use tracing::debug;

use crate::collaborators::ZoneStrategy;

/// Always the channel's default tax zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDefaultZoneStrategy;

impl ZoneStrategy for ChannelDefaultZoneStrategy {
    fn determine_tax_zone(&self, _zones: &[Zone], channel: &Channel, _order: &Order) -> Zone {
        channel.default_tax_zone.clone()
    }
}

/// The first zone containing the order's shipping country, falling back to
/// the channel default when the order has no country or no zone matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShippingCountryZoneStrategy;

impl ZoneStrategy for ShippingCountryZoneStrategy {
    fn determine_tax_zone(&self, zones: &[Zone], channel: &Channel, order: &Order) -> Zone {
        let matched = order
            .shipping_country
            .as_deref()
            .and_then(|country| zones.iter().find(|zone| zone.contains_country(country)));

        match matched {
            Some(zone) => zone.clone(),
            None => {
                debug!(
                    order = %order.code,
                    country = ?order.shipping_country,
                    "No zone for shipping country, using channel default"
                );
                channel.default_tax_zone.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, members: &[&str]) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_uppercase(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn channel() -> Channel {
        Channel {
            code: "web".to_string(),
            default_tax_zone: zone("uk", &["GB"]),
            prices_include_tax: false,
        }
    }

    #[test]
    fn test_channel_default_ignores_order() {
        let mut order = Order::new("T-1");
        order.shipping_country = Some("DE".to_string());

        let active = ChannelDefaultZoneStrategy.determine_tax_zone(
            &[zone("eu", &["DE"])],
            &channel(),
            &order,
        );

        assert_eq!(active.id, "uk");
    }

    #[test]
    fn test_shipping_country_selects_matching_zone() {
        let zones = [zone("uk", &["GB"]), zone("eu", &["DE", "FR"])];
        let mut order = Order::new("T-1");
        order.shipping_country = Some("fr".to_string());

        let active = ShippingCountryZoneStrategy.determine_tax_zone(&zones, &channel(), &order);

        assert_eq!(active.id, "eu");
    }

    #[test]
    fn test_shipping_country_falls_back_to_default() {
        let zones = [zone("eu", &["DE"])];
        let mut order = Order::new("T-1");
        order.shipping_country = Some("US".to_string());

        let active = ShippingCountryZoneStrategy.determine_tax_zone(&zones, &channel(), &order);
        assert_eq!(active.id, "uk");

        order.shipping_country = None;
        let active = ShippingCountryZoneStrategy.determine_tax_zone(&zones, &channel(), &order);
        assert_eq!(active.id, "uk");
    }
}
