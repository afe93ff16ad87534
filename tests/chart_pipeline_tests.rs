use data_explorer::charts::{
    ChartCatalog, ChartId, ChartOutcome, ChartRequest, ColumnSelection, Figure, RenderedChart, Tab,
    NO_NUMERIC_NOTICE,
};
use data_explorer::data::{DatasetKind, DatasetProvider, DatasetTable, BILL_PER_PERSON};
use data_explorer::{DisplayOptions, Explorer, PanelContent, Selections};
use polars::prelude::*;
use std::path::PathBuf;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn request(dataset: DatasetKind, chart: ChartId, selection: ColumnSelection) -> ChartRequest {
    ChartRequest {
        dataset,
        chart,
        selection,
        options: DisplayOptions::default(),
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("data_explorer_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn tips_feature_interaction_end_to_end() {
    let dir = scratch_dir("tips");
    std::fs::write(
        dir.join("tips.csv"),
        "total_bill,tip,sex,smoker,day,time,size\n\
         20.0,3.0,Female,No,Sun,Dinner,4\n\
         16.99,1.01,Female,No,Sun,Dinner,2\n\
         10.34,1.66,Male,No,Sun,Dinner,3\n",
    )
    .unwrap();

    let provider = DatasetProvider::with_data_dir(Some(dir.clone()));
    let mut table = provider.load(DatasetKind::Tips).unwrap();
    assert!(!table.has_column(BILL_PER_PERSON));

    let req = request(
        DatasetKind::Tips,
        ChartId::TipsInteraction,
        ColumnSelection::default(),
    );
    let rendered = ChartCatalog::generate(&mut table, &req, 1).unwrap();

    assert!(table.has_column(BILL_PER_PERSON));
    let per_person = table.numeric_values(BILL_PER_PERSON).unwrap();
    assert_eq!(per_person[0], Some(5.0));

    let RenderedChart::Image(result) = rendered else {
        panic!("interaction chart should render");
    };
    assert_eq!(result.file_name, "tips_interaction.png");
    assert!(result.png.len() > PNG_SIGNATURE.len());
    assert!(result.png.starts_with(&PNG_SIGNATURE));

    // Second pass leaves the derived column unchanged.
    ChartCatalog::generate(&mut table, &req, 1).unwrap();
    assert_eq!(table.numeric_values(BILL_PER_PERSON).unwrap(), per_person);
    assert_eq!(table.columns().len(), 8);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn bill_per_person_matches_every_bundled_row() {
    let mut table = DatasetProvider::new().load(DatasetKind::Tips).unwrap();
    ChartCatalog::prepare(&mut table, ChartId::TipsInteraction).unwrap();

    let bills = table.numeric_values("total_bill").unwrap();
    let sizes = table.numeric_values("size").unwrap();
    let derived = table.numeric_values(BILL_PER_PERSON).unwrap();
    for ((bill, size), per_person) in bills.iter().zip(&sizes).zip(&derived) {
        let expected = bill.unwrap() / size.unwrap();
        assert!((per_person.unwrap() - expected).abs() < 1e-12);
    }
}

#[test]
fn heatmap_without_numeric_columns_is_a_notice() {
    let df = df!(
        "sex" => ["male", "female", "female"],
        "embark_town" => ["Southampton", "Cherbourg", "Queenstown"]
    )
    .unwrap();
    let table = DatasetTable::new(DatasetKind::Titanic, df);
    let req = request(
        DatasetKind::Titanic,
        ChartId::CorrelationHeatmap,
        ColumnSelection::default(),
    );

    let outcome = ChartCatalog::build(&table, &req).unwrap();
    assert_eq!(outcome, ChartOutcome::Notice(NO_NUMERIC_NOTICE.to_string()));
}

#[test]
fn custom_scatter_series_follow_hue() {
    let table = DatasetProvider::new().load(DatasetKind::Tips).unwrap();
    let series_count = |hue: Option<&str>| {
        let selection = ColumnSelection {
            x: Some("total_bill".to_string()),
            y: Some("tip".to_string()),
            hue: hue.map(str::to_string),
            ..ColumnSelection::default()
        };
        let req = request(DatasetKind::Tips, ChartId::CustomScatter, selection);
        match ChartCatalog::build(&table, &req).unwrap() {
            ChartOutcome::Figure(Figure::Scatter(fig)) => fig.series.len(),
            other => panic!("expected scatter, got {other:?}"),
        }
    };

    assert_eq!(series_count(None), 1);
    assert_eq!(series_count(Some("day")), table.levels("day").unwrap().len());
    assert_eq!(series_count(Some("sex")), 2);
}

#[test]
fn advanced_tab_renders_every_iris_chart() {
    let selections = Selections {
        dataset: DatasetKind::Iris,
        tab: Tab::Advanced,
        ..Selections::default()
    };
    let view = Explorer::default().evaluate(&selections).unwrap();

    let names: Vec<_> = view
        .panels
        .iter()
        .map(|p| match &p.content {
            PanelContent::Rendered(result) => result.file_name.clone(),
            other => panic!("{:?} did not render: {other:?}", p.chart),
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "correlation_heatmap.png",
            "iris_pairplot.png",
            "sepal_length_distribution.png"
        ]
    );
}

#[test]
fn downloaded_png_is_written_to_disk() {
    let dir = scratch_dir("download");
    let selections = Selections::new(DatasetKind::Titanic, DisplayOptions::default());
    let explorer = Explorer::default();
    let view = explorer.evaluate(&selections).unwrap();

    let RenderedChart::Image(result) = explorer.export(&view, ChartId::TitanicSurvival, 3).unwrap()
    else {
        panic!("count plot should render");
    };
    assert_eq!((result.width, result.height), (1800, 1200));

    let path = dir.join(&result.file_name);
    Explorer::save_png(&result, &path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, result.png);

    std::fs::remove_dir_all(dir).ok();
}
