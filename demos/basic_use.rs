use station_fluctuation::{
    compute_station_fluctuations, get_station_with_most_fluctuation_time_bound, AnalysisError,
    ReadingLoader, TimeWindow, WeatherReport,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), AnalysisError> {
    env_logger::init();

    let readings = ReadingLoader::new()
        .load(Path::new("data/sample.csv"))
        .await?;

    let report = WeatherReport::builder()
        .readings(&readings)
        .start(2000.001)
        .end(2000.456)
        .build()?;
    println!("{}\n", report);

    let window = TimeWindow::new(2000.001, 2000.456)?;
    println!("Per-station fluctuation inside {}", window);
    for (station_id, total) in compute_station_fluctuations(&readings, Some(&window)).iter() {
        println!("Station {:>4}: {:.1}", station_id, total);
    }

    // Bounds that are not numbers are reported as -1
    let station = get_station_with_most_fluctuation_time_bound(&readings, 2000.001, "hello");
    println!("\nStation for a non-numeric bound: {}", station);

    Ok(())
}
