//! Shipping pass: selects and prices the order's shipping method.

use tally_core::{Order, ShippingQuote};
use tracing::{debug, warn};

use crate::collaborators::ShippingQuoter;
use crate::context::RequestContext;
use crate::error::PricingResult;

/// Re-prices the chosen shipping method, or picks the first eligible one.
///
/// With no eligible methods the order's shipping is left as it was.
pub async fn apply_shipping(
    order: &mut Order,
    quoter: &dyn ShippingQuoter,
    ctx: &RequestContext,
) -> PricingResult<()> {
    let quotes = quoter.eligible_quotes(ctx, order).await?;

    let Some(quote) = select_quote(order.shipping_method.as_deref(), &quotes) else {
        warn!(order = %order.code, "No eligible shipping method");
        return Ok(());
    };

    debug!(method = %quote.method.code, price = %quote.price, "Selected shipping");
    order.shipping_cost = quote.price;
    order.shipping_method = Some(quote.method.id.clone());
    Ok(())
}

fn select_quote<'q>(current: Option<&str>, quotes: &'q [ShippingQuote]) -> Option<&'q ShippingQuote> {
    current
        .and_then(|id| quotes.iter().find(|quote| quote.method.id == id))
        .or_else(|| quotes.first())
}
