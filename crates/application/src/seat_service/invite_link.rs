use lectern_core::{AppError, AppResult};
use lectern_domain::SeatSource;
use url::Url;

/// Builds the link a seat holder shares with teammates.
///
/// Bulk coupons redeem through `<base>/?code=<couponId>`, team subscriptions
/// through `<base>/team/invite/<subscriptionId>`.
pub fn invite_link(source: &SeatSource, base_url: &str) -> AppResult<String> {
    source.validate()?;

    let mut url = Url::parse(base_url)
        .map_err(|error| AppError::Validation(format!("invalid invite base url: {error}")))?;

    match source {
        SeatSource::BulkCoupon(coupon) => {
            url.query_pairs_mut().append_pair("code", &coupon.id);
        }
        SeatSource::Subscription(subscription) => {
            url.path_segments_mut()
                .map_err(|()| {
                    AppError::Validation(format!("invite base url '{base_url}' cannot have a path"))
                })?
                .pop_if_empty()
                .extend(["team", "invite", subscription.id.as_str()]);
        }
    }

    Ok(url.into())
}
