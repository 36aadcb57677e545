use chrono::{Duration, TimeZone, Utc};
use market_lens::{
    run_correlation_analysis, Dataset, Figure, FigureSize, LensError, MacdOptions, Presenter,
    PriceSmaOptions, RsiOptions, TerminalPresenter, TextPresenter, Visualizer,
};
use tracing::info;

const DAYS: usize = 120;

fn main() -> Result<(), LensError> {
    // Initialise INFO Tracing log subscriber
    init_logging();

    let data = synthetic_dataset(DAYS)?;
    info!(rows = data.len(), "built synthetic dataset");

    // Three stacked panels on one caller-owned figure, presented once at the end
    let mut dashboard = Figure::subplots(FigureSize::new(120, 54), 3);
    let mut visualizer = Visualizer::new(&data);
    visualizer.plot_close_with_sma(&PriceSmaOptions::default(), Some(dashboard.handle(0)?))?;
    visualizer.plot_rsi(&RsiOptions::default(), Some(dashboard.handle(1)?))?;
    visualizer.plot_macd(&MacdOptions::default(), Some(dashboard.handle(2)?))?;

    TerminalPresenter::new().present(&dashboard)?;

    // Heatmaps written inline
    let mut stdout = TextPresenter::stdout();
    run_correlation_analysis(&data, &["Close", "Volume", "RSI", "MACD"], &mut stdout)
}

/// Deterministic random-walk prices with the usual indicators derived from them.
fn synthetic_dataset(days: usize) -> Result<Dataset, LensError> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let index = (0..days)
        .map(|day| start + Duration::days(day as i64))
        .collect();

    let close: Vec<f64> = (0..days)
        .scan(100.0, |price, day| {
            let t = day as f64;
            *price *= 1.0 + 0.012 * (t * 0.37).sin() + 0.006 * (t * 1.91).cos();
            Some(*price)
        })
        .collect();

    let volume: Vec<f64> = close
        .windows(2)
        .map(|w| 1_000.0 + 40_000.0 * ((w[1] - w[0]) / w[0]).abs())
        .chain(std::iter::once(1_000.0))
        .collect();

    let sma = simple_moving_average(&close, 20);
    let rsi = relative_strength_index(&close, 14);
    let macd: Vec<f64> = exponential_moving_average(&close, 12)
        .iter()
        .zip(exponential_moving_average(&close, 26))
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal = exponential_moving_average(&macd, 9);

    Dataset::new(index)
        .with_column("Close", close)?
        .with_column("Volume", volume)?
        .with_column("SMA_20", sma)?
        .with_column("RSI", rsi)?
        .with_column("MACD", macd)?
        .with_column("MACD_signal", signal)
}

fn simple_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| match i + 1 >= window {
            true => values[i + 1 - window..=i].iter().sum::<f64>() / window as f64,
            false => f64::NAN,
        })
        .collect()
}

fn exponential_moving_average(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    values
        .iter()
        .scan(None, |ema: &mut Option<f64>, value| {
            let next = match *ema {
                Some(prev) => alpha * value + (1.0 - alpha) * prev,
                None => *value,
            };
            *ema = Some(next);
            Some(next)
        })
        .collect()
}

fn relative_strength_index(values: &[f64], period: usize) -> Vec<f64> {
    let mut rsi = vec![f64::NAN; values.len()];
    for i in period..values.len() {
        let (gain, loss) = values[i - period..=i]
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0, 0.0), |(gain, loss), change| match change > 0.0 {
                true => (gain + change, loss),
                false => (gain, loss - change),
            });

        rsi[i] = match loss == 0.0 {
            true => 100.0,
            false => 100.0 - 100.0 / (1.0 + gain / loss),
        };
    }
    rsi
}

fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO level
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Keep stdout for the figures
        .with_writer(std::io::stderr)
        // Use colored output in debug mode
        .with_ansi(cfg!(debug_assertions))
        // Install this Tracing subscriber as global default
        .init()
}
