mod common;
mod properties;
mod routing;
