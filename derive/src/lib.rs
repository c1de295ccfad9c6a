use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_reading;

#[proc_macro_derive(FromReading, attributes(field))]
pub fn derive_from_reading(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_reading::expand_from_reading(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
