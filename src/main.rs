use clap::{Arg, ArgAction, Command};
use lanesim::logging::{init_logging, parse_log_level, LogConfig, LogOutput};
use lanesim::scenario::ScenarioConfig;
use lanesim::simulation::SimulationEngine;
use tracing::{error, info};

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("lanesim")
        .version("0.1.0")
        .about("レーン追従シミュレーション (Lane Following Simulation)")
        .long_about("アーケードレーサーのレーン追従ステアリングを時間駆動で実行します。\n\
                     AI車両のブロック挙動やプレイヤーの車線変更をシナリオで再現できます。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、使用方法を表示して終了します。")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .value_parser(["console", "file", "both"])
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)。-v より優先")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let output = matches
        .get_one::<String>("log-output")
        .and_then(|s| s.parse::<LogOutput>().ok())
        .unwrap_or(LogOutput::Console);
    let mut log_config = LogConfig::from_verbosity(verbose_level, output);
    if let Some(level) = matches.get_one::<String>("log-level") {
        log_config.level = parse_log_level(level);
    }

    let _guard = match init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            None
        }
    };

    println!("レーン追従シミュレーション - lanesim v0.1.0");
    println!();

    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        match run_scenario(scenario_path, matches.get_flag("info"), verbose_level) {
            Ok(_) => info!("シナリオ実行が正常に完了しました"),
            Err(e) => {
                error!("シナリオ実行エラー: {}", e);
                eprintln!("エラー: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        show_default_help();
    }
}

/// シナリオファイルを読み込んで実行
fn run_scenario(scenario_path: &str, info_only: bool, verbose_level: u8) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;
    info!("シナリオファイル読み込み完了: {}", scenario_path);

    scenario.print_summary();
    if info_only {
        return Ok(());
    }
    println!();

    let mut simulation = SimulationEngine::new(scenario, verbose_level);
    simulation.initialize()?;
    simulation.run();

    println!();
    simulation.print_results();

    Ok(())
}

/// デフォルトヘルプを表示
fn show_default_help() {
    println!("使用方法:");
    println!("  lanesim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>    シナリオファイルを指定して実行");
    println!("  -i, --info               シナリオ情報のみ表示");
    println!("  -v, --verbose            詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-output <TARGET> ログ出力先 (console, file, both)");
    println!("      --log-level <LEVEL>  ログレベル");
    println!("  -h, --help               このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/oval_track.yaml  - 3車線のオーバルコース（プレイヤー + AI）");
    println!();
    println!("例:");
    println!("  lanesim -s scenarios/oval_track.yaml");
    println!("  lanesim -s scenarios/oval_track.yaml -vv --log-output both");
    println!("  lanesim -s scenarios/oval_track.yaml -i");
}
