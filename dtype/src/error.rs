use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Tag does not name any argument type.
    #[snafu(display("unknown argument type tag: {tag:?}"))]
    UnknownTag { tag: String },
}
