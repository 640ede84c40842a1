/// Upstream-specific quirks that influence how requests are shaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamQuirks {
	/// `custtype` header value (`P` for personal accounts, `B` for corporate ones).
	pub customer_type: String,
	/// Indicates whether quote requests repeat the `appsecret` header next to `appkey`.
	pub send_app_secret: bool,
}
impl Default for UpstreamQuirks {
	fn default() -> Self {
		Self { customer_type: "P".into(), send_app_secret: true }
	}
}
