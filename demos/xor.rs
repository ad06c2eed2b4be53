use neuron::{ActivationLayer, DenseLayer, NeuralNetwork, SgdOptimizer, Tensor};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> neuron::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        .iter()
        .map(|x| Tensor::new(vec![x.to_vec()]))
        .collect::<neuron::Result<Vec<_>>>()?;
    let targets = [0.0, 1.0, 1.0, 0.0]
        .iter()
        .map(|&y| Tensor::new(vec![vec![y]]))
        .collect::<neuron::Result<Vec<_>>>()?;

    let mut network = NeuralNetwork::new();
    network.add_layer(DenseLayer::new(2, 8)?);
    network.add_layer(ActivationLayer::new("relu")?);
    network.add_layer(DenseLayer::new(8, 1)?);
    network.add_layer(ActivationLayer::new("sigmoid")?);
    println!("{}", network.architecture());

    network.set_training_listener(|epoch: usize, total: usize, loss: f64| {
        if epoch % 500 == 0 {
            info!("epoch {}/{}: loss = {}", epoch, total, loss);
        }
    });
    let optimizer = SgdOptimizer::new(0.5)?;
    network.train(&inputs, &targets, 5000, &optimizer)?;

    let evaluation = network.evaluate(&inputs, &targets)?;
    println!("loss: {}, accuracy: {}", evaluation.loss, evaluation.accuracy);
    for input in &inputs {
        println!("{:?} -> {:?}", input.data()[0], network.predict(input)?.data()[0]);
    }
    Ok(())
}
