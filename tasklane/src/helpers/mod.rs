pub mod auth;
pub mod cookie;
pub mod percent;

pub fn set_none_if_empty(opt: &mut Option<String>) {
	if opt.as_deref() == Some("") {
		*opt = None;
	}
}
