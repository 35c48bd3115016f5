use bon::bon;
use copyan_dtype::ArgumentDefinition;

/// Everything needed to generate one kernel's launch wrapper.
///
/// `template` is the launch body with `{key}` placeholders, e.g.
/// `reduce_kernel<{BLOCK}><<<grid, {BLOCK}, 0, stream>>>(X, y, N);`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelRequest {
    pub name: String,
    /// Extra includes, emitted verbatim after `#include ` (quoting included).
    pub includes: Vec<String>,
    pub arg_defs: Vec<ArgumentDefinition>,
    pub template: String,
}

#[bon]
impl KernelRequest {
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        #[builder(default)] includes: Vec<String>,
        #[builder(default)] arg_defs: Vec<ArgumentDefinition>,
        #[builder(into)] template: String,
    ) -> Self {
        Self { name, includes, arg_defs, template }
    }
}
