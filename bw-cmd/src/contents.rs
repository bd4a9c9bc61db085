//! Catalogue listing.

use bw_core::client::RemoteClient;
use bw_core::contents::Contents;
use bw_core::selection::{SelectionField, SelectionState};
use log::info;

/// Print every country/county/region the service advertises, one path per line.
pub async fn run_contents<C: RemoteClient>(client: &C) -> anyhow::Result<()> {
    let contents = client.fetch_contents().await?;
    info!("Catalogue lists {} countries", contents.countries.len());
    for line in catalogue_lines(contents) {
        println!("{}", line);
    }
    Ok(())
}

/// Walks the catalogue the same way an interactive picker would, one level at a time.
fn catalogue_lines(contents: Contents) -> Vec<String> {
    let mut state = SelectionState::with_catalogue(contents);
    let mut lines = Vec::new();
    for country in state.countries().to_vec() {
        state.set(SelectionField::Country, &country);
        for county in state.available_counties().to_vec() {
            state.set(SelectionField::County, &county);
            let regions = state.available_regions();
            if regions.is_empty() {
                lines.push(format!("{}/{}", country, county));
            }
            for region in regions {
                lines.push(format!("{}/{}/{}", country, county, region));
            }
        }
    }
    lines
}
