fn main() -> Result<(), pbpk::PbpkError> {
    use pbpk::prelude::*;

    let model = Pbpk::new(Parameters::default())?;
    let regimen = Regimen::builder()
        .bolus(0.0, 100.0, Compartment::GutLumen)
        .build()?;
    let times: Vec<f64> = (0..=24).map(|t| t as f64).collect();
    let trajectory = model.simulate(&regimen, &times, &SolverSettings::default())?;

    println!("{}", Trajectory::headers().join(","));
    for record in trajectory.records() {
        let row: Vec<String> = std::iter::once(record.time)
            .chain(record.amounts)
            .chain(record.concentrations)
            .map(|v| format!("{:.6}", v))
            .collect();
        println!("{}", row.join(","));
    }

    if let Some(cvenous) = trajectory.concentrations(Compartment::Venous) {
        let cvenous = cvenous.to_vec();
        if let Some((tmax, cmax)) = auc::cmax(&times, &cvenous) {
            println!("Cmax {:.4} mg/L at {} h", cmax, tmax);
        }
        println!("AUC(0-24) {:.4} mg*h/L", auc::auc(&times, &cvenous)?);
    }
    Ok(())
}
