//! Example: calibrate a survey, tie a well and read traces around it
//!
//! Run with: cargo run --example survey_demo

use ndarray::Array2;
use seisurvey::{
    AxisLayout, FlatFileStore, SeismicVolume, StoreMetadata, Survey, SurveyGeometry, VolumeIndex,
    Well,
};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("seisurvey example: survey calibration and well tie-in");
    println!("=====================================================\n");

    // Survey definition in the current schema shape (the F3 demo survey)
    let definition = json!({
        "inline_range": [200, 640, 20],
        "crline_range": [700, 1200, 20],
        "z_range": [400, 1100, 20, "T"],
        "point_A": [100, 300, 605835.516689, 6073556.38222],
        "point_B": [100, 1250, 629576.257713, 6074219.892946],
        "point_C": [750, 1250, 629122.546506, 6090463.168806]
    });
    let geometry = SurveyGeometry::from_value(&definition)?;

    println!("Survey grid:");
    println!(
        "  Inline:    {} lines {}",
        geometry.n_inline(),
        geometry.inline_range
    );
    println!(
        "  Crossline: {} lines {}",
        geometry.n_crline(),
        geometry.crline_range
    );
    println!(
        "  Vertical:  {} samples [{}, {}, {}]",
        geometry.n_depth(),
        geometry.depth_range.start,
        geometry.depth_range.end,
        geometry.depth_range.step
    );

    let mut survey = Survey::new(geometry.clone())?;
    let transform = survey.transform();
    println!("\nDerived geometry:");
    println!(
        "  Bin size:  {} x {} m",
        transform.inline_bin(),
        transform.crline_bin()
    );
    println!("  Area:      {} km2", transform.area());
    println!("  Azimuth:   {:.2} deg", transform.azimuth());
    println!("  Inverted:  {}", transform.inverted_axis());

    // Create a filesystem-backed volume in a temp directory
    let temp_dir = tempfile::tempdir()?;
    let layout = AxisLayout::new(
        geometry.inline_range,
        geometry.crline_range,
        geometry.depth_range.clone(),
    );
    let store = FlatFileStore::create(
        temp_dir.path().join("poststack"),
        StoreMetadata::new(layout).with_property("seis"),
    )?;
    let mut volume = SeismicVolume::new(geometry.clone(), Box::new(store))?;
    println!("\nCreated volume at {}", temp_dir.path().display());

    // Write one inline section, then read it back by index
    let section = Array2::from_shape_fn(
        (geometry.n_crline(), geometry.n_depth()),
        |(i, j)| (i + j) as f32,
    );
    volume.update(VolumeIndex::Inline(300), &section)?;
    let read_back = volume.data(VolumeIndex::Inline(300))?;
    println!("Inline 300 section shape: {:?}", read_back.shape());

    survey.add_volume("poststack", volume);

    // Tie a well by its physical location and fetch nearby traces
    let tie = survey.add_well(Well::new("CN-1", 618191.0, 6078903.5))?;
    println!("\nWell CN-1 tied to (inline, crline) = {:?}", tie);

    let traces = survey.get_seis("poststack", "CN-1", 1)?;
    println!("Traces within 1 grid step of the tie:");
    for ((inline, crline), trace) in &traces {
        println!(
            "  ({}, {}): {} samples, first = {}",
            inline,
            crline,
            trace.len(),
            trace[0]
        );
    }

    println!("\nDone");
    Ok(())
}
