use clap::{Parser, Subcommand, ValueEnum};
use nocode_logic::prelude::*;
use nocode_logic::state::StateStep;
use serde::de::DeserializeOwned;
use std::fs;
use std::time::Instant;

/// CLI-side copy of the data types for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DataTypeCli {
    Any,
    Boolean,
    Number,
    #[value(name = "string")]
    Text,
    Date,
    List,
    Object,
}

impl From<DataTypeCli> for NoCodeDataType {
    fn from(value: DataTypeCli) -> Self {
        match value {
            DataTypeCli::Any => NoCodeDataType::Any,
            DataTypeCli::Boolean => NoCodeDataType::Boolean,
            DataTypeCli::Number => NoCodeDataType::Number,
            DataTypeCli::Text => NoCodeDataType::String,
            DataTypeCli::Date => NoCodeDataType::Date,
            DataTypeCli::List => NoCodeDataType::List,
            DataTypeCli::Object => NoCodeDataType::Object,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeparatorCli {
    Auto,
    Dot,
    Comma,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StepCli {
    Visibility,
    Value,
    Override,
    Validation,
}

impl From<StepCli> for StateStep {
    fn from(value: StepCli) -> Self {
        match value {
            StepCli::Visibility => StateStep::Visibility,
            StepCli::Value => StateStep::Value,
            StepCli::Override => StateStep::Override,
            StepCli::Validation => StateStep::Validation,
        }
    }
}

/// Evaluates no-code form logic from JSON files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Decimal separator used for number literals
    #[arg(long, value_enum, global = true, default_value = "auto")]
    decimal_separator: SeparatorCli,

    /// Deepest allowed nesting of expressions or condition sets
    #[arg(long, global = true, default_value_t = 128)]
    max_depth: usize,

    /// Optional operator catalog JSON merged into the built-in operators
    #[arg(long, global = true)]
    catalog: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a condition set
    Condition {
        /// Path to the condition set JSON file
        set_path: String,
        /// Optional path to the sample data JSON file
        sample_data_path: Option<String>,
    },
    /// Evaluate an expression
    Expression {
        /// Path to the expression JSON file
        expression_path: String,
        /// Optional path to the sample data JSON file
        sample_data_path: Option<String>,
        /// The type the result is expected to have
        #[arg(short = 't', long = "type", value_enum, default_value = "any")]
        desired_type: DataTypeCli,
    },
    /// Determine the state of a whole form
    State {
        /// Path to the form logic JSON file
        form_path: String,
        /// Optional path to the sample data JSON file
        sample_data_path: Option<String>,
        /// Steps to skip
        #[arg(long, value_enum)]
        skip: Vec<StepCli>,
    },
    /// List the available operators
    Operators {
        #[arg(long, value_enum)]
        output_type: Option<DataTypeCli>,
        #[arg(long, value_enum)]
        input_type: Option<DataTypeCli>,
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let options = EvaluatorOptions {
        max_depth: cli.max_depth,
        decimal_separator: match cli.decimal_separator {
            SeparatorCli::Auto => DecimalSeparator::Auto,
            SeparatorCli::Dot => DecimalSeparator::Dot,
            SeparatorCli::Comma => DecimalSeparator::Comma,
        },
    };
    let registry = load_registry(cli.catalog.as_deref());

    match cli.command {
        Command::Condition {
            set_path,
            sample_data_path,
        } => run_condition(&set_path, sample_data_path.as_deref(), options),
        Command::Expression {
            expression_path,
            sample_data_path,
            desired_type,
        } => run_expression(
            &registry,
            &expression_path,
            sample_data_path.as_deref(),
            desired_type.into(),
            options,
        ),
        Command::State {
            form_path,
            sample_data_path,
            skip,
        } => run_state(&registry, &form_path, sample_data_path.as_deref(), &skip, options),
        Command::Operators {
            output_type,
            input_type,
            search,
        } => {
            let query = OperatorQuery {
                output_type: output_type.map(Into::into),
                input_type: input_type.map(Into::into),
                search,
            };
            list_operators(&registry, &query);
        }
    }
}

fn load_registry(catalog_path: Option<&str>) -> OperatorRegistry {
    let mut registry = OperatorRegistry::with_builtins();
    if let Some(path) = catalog_path {
        let descriptors: Vec<NoCodeOperatorDetails> = read_json(path, "operator catalog");
        let added = registry.merge_catalog(descriptors);
        println!("Loaded {} remote operator descriptors from '{}'", added, path);
    }
    registry
}

fn load_data(sample_data_path: Option<&str>) -> DataContext {
    match sample_data_path {
        Some(path) => SampleData::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load sample data: {}", e)))
            .to_context(),
        None => {
            println!("No sample data file provided. Evaluating against an empty form.");
            DataContext::new()
        }
    }
}

fn run_condition(set_path: &str, sample_data_path: Option<&str>, options: EvaluatorOptions) {
    let set: ConditionSet = read_json(set_path, "condition set");
    let data = load_data(sample_data_path);
    report_issues(&validate_condition_set_with_options(
        &set,
        Some(&data as &dyn ReferenceResolver),
        &options,
    ));

    let start = Instant::now();
    let evaluator = ConditionEvaluator::builder().with_options(options).build();
    let trace = evaluator
        .explain(&set, &data)
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));
    let duration = start.elapsed();

    println!("\nEvaluation Finished!");
    println!("  -> Outcome: {}", trace.get_outcome().unwrap_or(false));
    println!(
        "  -> Reason: {}",
        TraceFormatter::format_condition_trace(&trace)
    );
    let messages = trace.messages_of_true_conditions();
    if !messages.is_empty() {
        println!("  -> Messages if used for validation:");
        for message in messages {
            println!("     - {}", message);
        }
    }
    println!("\nEvaluation:           {:?}", duration);
}

fn run_expression(
    registry: &OperatorRegistry,
    expression_path: &str,
    sample_data_path: Option<&str>,
    desired_type: NoCodeDataType,
    options: EvaluatorOptions,
) {
    let expression: NoCodeExpression = read_json(expression_path, "expression");
    let data = load_data(sample_data_path);
    println!("{}", expression.display_tree());
    report_issues(&validate_expression_with_options(
        &expression,
        registry,
        Some(&data as &dyn ReferenceResolver),
        desired_type,
        &options,
    ));

    let start = Instant::now();
    let evaluator = ExpressionEvaluator::builder(registry)
        .with_options(options)
        .build();
    let evaluated = evaluator
        .evaluate(&expression, &data, desired_type)
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));
    let duration = start.elapsed();

    println!("\nEvaluation Finished!");
    println!(
        "  -> Result: {} ({})",
        evaluated.value, evaluated.declared_type
    );
    println!("  -> Reason: {}", evaluated.reason());
    for warning in &evaluated.warnings {
        println!(
            "  -> Warning: '{}' returns {} where {} is expected",
            warning.operator, warning.return_type, warning.desired_type
        );
    }
    println!("\nEvaluation:           {:?}", duration);
}

fn run_state(
    registry: &OperatorRegistry,
    form_path: &str,
    sample_data_path: Option<&str>,
    skip: &[StepCli],
    options: EvaluatorOptions,
) {
    let form = FormLogic::from_file(form_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load form logic: {}", e)));
    let data = load_data(sample_data_path);
    let request = skip.iter().fold(DetermineStateRequest::all(), |request, step| {
        request.with_step((*step).into(), Steps::None)
    });

    let start = Instant::now();
    let state = FormStateEvaluator::with_options(registry, options).determine_state(
        &form, &data, &request,
    );
    let duration = start.elapsed();

    println!("\n--- Form State ---");
    for element in &state.elements {
        let value = element
            .effective_value()
            .map_or("-".to_string(), |v| v.to_string());
        println!(
            "{:<24} visible: {:<5} valid: {:<5} value: {}",
            element.id, element.visible, element.valid, value
        );
        for message in &element.messages {
            println!("    ! {}", message);
        }
    }

    let failures: Vec<_> = state.failures().collect();
    if !failures.is_empty() {
        println!("\n--- Failures ---");
        for (id, failure) in failures {
            println!("{} ({}): {}", id, failure.step, failure.error);
        }
    }

    println!("\n--- Summary ---");
    println!("Elements:             {}", state.elements.len());
    println!("Form Valid:           {}", state.is_valid());
    println!("Evaluation:           {:?}", duration);
}

fn list_operators(registry: &OperatorRegistry, query: &OperatorQuery) {
    let operators = registry.list_operators(query);
    println!("{} operators match '?{}'", operators.len(), query.to_query_string());
    for details in operators {
        let parameters: Vec<String> = details
            .parameters
            .iter()
            .map(|p| p.data_type.to_string())
            .collect();
        let origin = if registry.has_local_implementation(&details.identifier) {
            "local"
        } else {
            "remote"
        };
        println!(
            "  {:<22} ({}) -> {}  [{}]  {}",
            details.identifier,
            parameters.join(", "),
            details.return_type,
            origin,
            details.label
        );
    }
}

fn report_issues(issues: &[TreeIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("\n--- Editor Issues ---");
    for issue in issues {
        let path = if issue.path.is_empty() { "<root>" } else { &issue.path };
        println!("  {}: {:?}", path, issue.kind);
    }
}

fn read_json<T: DeserializeOwned>(path: &str, what: &str) -> T {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    });
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
